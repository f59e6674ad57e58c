use crate::api::ApiClient;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::session::{Role, Session};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let backend = state.api.as_ref().map(|api| {
        json!({
            "adminUrl": api.admin_url(),
            "newsUrl": api.news_url(),
        })
    });
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "backend": backend,
            "session": state.session.as_ref().map(helpers::session_json),
        }),
    )
}

fn handle_backend_connect(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(admin_url) = req.params.get("adminUrl").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing adminUrl", None);
    };
    let Some(news_url) = req.params.get("newsUrl").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing newsUrl", None);
    };

    let client = match ApiClient::new(admin_url, news_url) {
        Ok(c) => c,
        Err(e) => return helpers::api_error(&req.id, &e),
    };

    log::info!(
        "backend connected: admin={} news={}",
        client.admin_url(),
        client.news_url()
    );
    let result = json!({
        "adminUrl": client.admin_url(),
        "newsUrl": client.news_url(),
    });
    state.api = Some(client);
    // Anything fetched from a previous backend is meaningless now.
    state.reset_views();
    ok(&req.id, result)
}

fn handle_session_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let token = match req.params.get("token").and_then(|v| v.as_str()) {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing token", None),
    };

    let user = req.params.get("user");
    let user_name = user
        .and_then(|u| u.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let role = user
        .and_then(|u| u.get("role"))
        .and_then(|v| v.as_str())
        .map(Role::parse)
        .unwrap_or(Role::Unknown);

    let session = Session {
        token,
        user_name,
        role,
    };
    log::info!(
        "session opened: role={} token={}",
        session.role.as_str(),
        session.token_fingerprint()
    );
    let result = helpers::session_json(&session);
    state.session = Some(session);
    ok(&req.id, result)
}

fn handle_session_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.session.take().is_some() {
        log::info!("session closed");
    }
    ok(&req.id, json!({ "loggedIn": false }))
}

fn handle_session_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.as_ref() {
        Some(s) => ok(
            &req.id,
            json!({ "loggedIn": true, "session": helpers::session_json(s) }),
        ),
        None => ok(&req.id, json!({ "loggedIn": false, "session": null })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "backend.connect" => Some(handle_backend_connect(state, req)),
        "session.login" => Some(handle_session_login(state, req)),
        "session.logout" => Some(handle_session_logout(state, req)),
        "session.info" => Some(handle_session_info(state, req)),
        _ => None,
    }
}
