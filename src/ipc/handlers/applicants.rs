use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::models::{decode_records, Applicant};
use serde_json::Value;

fn fetch_records(state: &AppState) -> Result<Vec<Applicant>, String> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err("backend not connected".to_string());
    };
    let endpoint = api.admin_endpoint("api/admissions/applicants");
    let payload = api
        .fetch_all_pages(&endpoint, &[], &session.token)
        .map_err(|e| e.to_string())?;
    decode_records(payload.items)
}

fn refetch(state: &mut AppState, id: &str) -> Option<serde_json::Value> {
    if let Some(resp) = helpers::ensure_ready(state, id) {
        return Some(resp);
    }
    let seq = state.applicants.view.begin_fetch();
    let outcome = fetch_records(state);
    state.applicants.view.complete_fetch(seq, outcome);
    None
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.applicants.reset();
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.applicants.view_model())
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.applicants.view_model())
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(term) = req.params.get("term").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing term", None);
    };
    state.applicants.filters.search = term.trim().to_string();
    state.applicants.view.page.reset();
    ok(&req.id, state.applicants.view_model())
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let registered = match req.params.get("registered") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("all") => None,
        Some(_) => return err(&req.id, "bad_params", "registered must be a boolean", None),
    };
    let cohort = match helpers::select_param(&req.params, "cohort") {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };

    state.applicants.filters.registered = registered;
    state.applicants.filters.cohort_id = cohort;
    state.applicants.view.page.reset();
    ok(&req.id, state.applicants.view_model())
}

fn handle_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(page) = req.params.get("page").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing page", None);
    };
    state.applicants.view.page.go_to_page(page);
    ok(&req.id, state.applicants.view_model())
}

fn handle_page_size(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(size) = req.params.get("size").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing size", None);
    };
    if let Err(m) = state.applicants.view.page.set_items_per_page(size as usize) {
        return err(&req.id, "bad_params", m, None);
    }
    ok(&req.id, state.applicants.view_model())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "applicants.open" => Some(handle_open(state, req)),
        "applicants.refresh" => Some(handle_refresh(state, req)),
        "applicants.search" => Some(handle_search(state, req)),
        "applicants.filter" => Some(handle_filter(state, req)),
        "applicants.page" => Some(handle_page(state, req)),
        "applicants.pageSize" => Some(handle_page_size(state, req)),
        _ => None,
    }
}
