use crate::api::{ApiError, ApiErrorCode};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::listview::SortDirection;
use crate::models::{decode_list_payload, decode_records, unwrap_detail_payload, Cohort};
use crate::stats::{cohort_progress, CohortPhase};
use crate::views::CohortSortKey;
use serde_json::{json, Value};

/// The cohorts listing is served whole; no page crawling.
fn fetch_records(state: &AppState) -> Result<Vec<Cohort>, String> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err("backend not connected".to_string());
    };
    let endpoint = api.admin_endpoint("api/academics/all-cohorts");
    let body = api
        .get_json(&endpoint, &session.token)
        .map_err(|e| e.to_string())?;
    let payload = decode_list_payload(body)?;
    decode_records(payload.items)
}

fn refetch(state: &mut AppState, id: &str) -> Option<serde_json::Value> {
    if let Some(resp) = helpers::ensure_ready(state, id) {
        return Some(resp);
    }
    let seq = state.cohorts.view.begin_fetch();
    let outcome = fetch_records(state);
    state.cohorts.view.complete_fetch(seq, outcome);
    None
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.cohorts.reset();
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(term) = req.params.get("term").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing term", None);
    };
    state.cohorts.filters.search = term.trim().to_string();
    state.cohorts.view.page.reset();
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let phase = match helpers::select_param(&req.params, "status") {
        Ok(None) => None,
        Ok(Some(s)) => match CohortPhase::parse(&s) {
            Some(p) => Some(p),
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "status must be upcoming, active or completed",
                    None,
                )
            }
        },
        Err(m) => return err(&req.id, "bad_params", m, None),
    };

    state.cohorts.filters.phase = phase;
    state.cohorts.view.page.reset();
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match req.params.get("key").and_then(|v| v.as_str()) {
        Some(k) => match CohortSortKey::parse(k) {
            Some(key) => key,
            None => return err(&req.id, "bad_params", "key must be startDate or name", None),
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

    state.cohorts.sort_key = key;
    state.cohorts.sort_dir = dir;
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(page) = req.params.get("page").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing page", None);
    };
    state.cohorts.view.page.go_to_page(page);
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn handle_page_size(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(size) = req.params.get("size").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing size", None);
    };
    if let Err(m) = state.cohorts.view.page.set_items_per_page(size as usize) {
        return err(&req.id, "bad_params", m, None);
    }
    ok(&req.id, state.cohorts.view_model(helpers::today()))
}

fn fetch_detail(state: &AppState, cohort_id: &str) -> Result<Value, ApiError> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err(ApiError::new(ApiErrorCode::Network, "backend not connected"));
    };
    let url = api.admin_endpoint(&format!("api/academics/cohorts/{}", cohort_id));
    let body = api.get_json(&url, &session.token)?;
    Ok(unwrap_detail_payload(body))
}

fn handle_detail(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let Some(cohort_id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    let record = match fetch_detail(state, cohort_id) {
        Ok(r) => r,
        Err(e) => return helpers::api_error(&req.id, &e),
    };

    let progress = {
        let start = record.get("startDate").and_then(|v| v.as_str()).unwrap_or("");
        let end = record.get("endDate").and_then(|v| v.as_str()).unwrap_or("");
        match cohort_progress(start, end, helpers::today()) {
            Some(p) => json!(p),
            None => Value::Null,
        }
    };

    ok(&req.id, json!({ "cohort": record, "progress": progress }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "cohorts.open" => Some(handle_open(state, req)),
        "cohorts.refresh" => Some(handle_refresh(state, req)),
        "cohorts.search" => Some(handle_search(state, req)),
        "cohorts.filter" => Some(handle_filter(state, req)),
        "cohorts.sort" => Some(handle_sort(state, req)),
        "cohorts.page" => Some(handle_page(state, req)),
        "cohorts.pageSize" => Some(handle_page_size(state, req)),
        "cohorts.detail" => Some(handle_detail(state, req)),
        _ => None,
    }
}
