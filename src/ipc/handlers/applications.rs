use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::listview::SortDirection;
use crate::models::{decode_records, unwrap_detail_payload, Application};
use crate::views::ApplicationSortKey;
use serde_json::json;

const STATUSES: [&str; 4] = ["PENDING", "ACCEPTED", "REJECTED", "WAITLISTED"];

fn fetch_records(state: &AppState) -> Result<Vec<Application>, String> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err("backend not connected".to_string());
    };
    let endpoint = api.admin_endpoint("api/admissions/applications");
    let payload = api
        .fetch_all_pages(&endpoint, &[], &session.token)
        .map_err(|e| e.to_string())?;
    decode_records(payload.items)
}

/// Fetch into the view. `Some` is a precondition error response; fetch
/// failures land in the view state instead.
fn refetch(state: &mut AppState, id: &str) -> Option<serde_json::Value> {
    if let Some(resp) = helpers::ensure_ready(state, id) {
        return Some(resp);
    }
    let seq = state.applications.view.begin_fetch();
    let outcome = fetch_records(state);
    state.applications.view.complete_fetch(seq, outcome);
    None
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.applications.reset();
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.applications.view_model())
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.applications.view_model())
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(term) = req.params.get("term").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing term", None);
    };
    state.applications.filters.search = term.trim().to_string();
    state.applications.view.page.reset();
    ok(&req.id, state.applications.view_model())
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match helpers::select_param(&req.params, "status") {
        Ok(v) => v.map(|s| s.to_uppercase()),
        Err(m) => return err(&req.id, "bad_params", m, None),
    };
    let program = match helpers::select_param(&req.params, "program") {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };

    state.applications.filters.status = status;
    state.applications.filters.program_id = program;
    state.applications.view.page.reset();
    ok(&req.id, state.applications.view_model())
}

fn handle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match req.params.get("key").and_then(|v| v.as_str()) {
        Some(k) => match ApplicationSortKey::parse(k) {
            Some(key) => key,
            None => return err(&req.id, "bad_params", "key must be submittedAt or name", None),
        },
        None => return err(&req.id, "bad_params", "missing key", None),
    };
    let dir = match req.params.get("direction").and_then(|v| v.as_str()) {
        Some(d) => match SortDirection::parse(d) {
            Some(dir) => dir,
            None => return err(&req.id, "bad_params", "direction must be asc or desc", None),
        },
        None => SortDirection::Asc,
    };

    state.applications.sort_key = key;
    state.applications.sort_dir = dir;
    ok(&req.id, state.applications.view_model())
}

fn handle_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(page) = req.params.get("page").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing page", None);
    };
    state.applications.view.page.go_to_page(page);
    ok(&req.id, state.applications.view_model())
}

fn handle_page_size(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(size) = req.params.get("size").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing size", None);
    };
    if let Err(m) = state.applications.view.page.set_items_per_page(size as usize) {
        return err(&req.id, "bad_params", m, None);
    }
    ok(&req.id, state.applications.view_model())
}

fn handle_update_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let allowed = state
        .session
        .as_ref()
        .map_or(false, |s| s.role.can_update_application_status());
    if !allowed {
        return err(
            &req.id,
            "forbidden",
            "only ADMIN or FACULTY may change an application status",
            None,
        );
    }

    let Some(app_id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    let status = match req.params.get("status").and_then(|v| v.as_str()) {
        Some(s) => s.trim().to_uppercase(),
        None => return err(&req.id, "bad_params", "missing status", None),
    };
    if !STATUSES.contains(&status.as_str()) {
        return err(
            &req.id,
            "bad_params",
            format!("status must be one of {}", STATUSES.join(", ")),
            None,
        );
    }
    let admin_notes = req
        .params
        .get("adminNotes")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let updated = {
        let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
            return err(&req.id, "no_backend", "call backend.connect first", None);
        };
        let mut body = json!({ "status": status });
        if let Some(notes) = admin_notes {
            body["adminNotes"] = json!(notes);
        }
        let url = api.admin_endpoint(&format!("api/admissions/applications/{}/status", app_id));
        match api.patch_json(&url, &session.token, &body) {
            Ok(resp_body) => unwrap_detail_payload(resp_body),
            Err(e) => return helpers::api_error(&req.id, &e),
        }
    };

    // No optimistic bookkeeping: the list is refetched so the view shows
    // what the backend now holds.
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(
        &req.id,
        json!({
            "updated": updated,
            "view": state.applications.view_model(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "applications.open" => Some(handle_open(state, req)),
        "applications.refresh" => Some(handle_refresh(state, req)),
        "applications.search" => Some(handle_search(state, req)),
        "applications.filter" => Some(handle_filter(state, req)),
        "applications.sort" => Some(handle_sort(state, req)),
        "applications.page" => Some(handle_page(state, req)),
        "applications.pageSize" => Some(handle_page_size(state, req)),
        "applications.updateStatus" => Some(handle_update_status(state, req)),
        _ => None,
    }
}
