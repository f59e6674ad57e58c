use crate::api::{ApiError, ApiErrorCode};
use crate::forms::ProgramForm;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::models::unwrap_detail_payload;
use serde_json::{json, Value};

fn fetch_detail(state: &AppState, path: &str) -> Result<Value, ApiError> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err(ApiError::new(ApiErrorCode::Network, "backend not connected"));
    };
    let url = api.admin_endpoint(path);
    let body = api.get_json(&url, &session.token)?;
    Ok(unwrap_detail_payload(body))
}

/// Shared shape of the three academics detail lookups.
fn handle_detail(
    state: &mut AppState,
    req: &Request,
    collection: &str,
    result_key: &str,
) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let Some(record_id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match fetch_detail(state, &format!("api/academics/{}/{}", collection, record_id)) {
        Ok(record) => ok(&req.id, json!({ result_key: record })),
        Err(e) => helpers::api_error(&req.id, &e),
    }
}

fn handle_program_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }

    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(code) = req.params.get("code").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing code", None);
    };
    let Some(department_id) = req.params.get("departmentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing departmentId", None);
    };
    let duration = req.params.get("durationSemesters").and_then(|v| v.as_i64());
    let description = req
        .params
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let form = ProgramForm {
        name: name.to_string(),
        code: code.to_string(),
        department_id: department_id.to_string(),
        duration_semesters: duration,
        description: description.to_string(),
    };
    let violations = form.validate();
    if !violations.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "program form is invalid",
            Some(json!({ "violations": violations })),
        );
    }

    let created = {
        let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
            return err(&req.id, "no_backend", "call backend.connect first", None);
        };
        let mut body = json!({
            "name": form.name.trim(),
            "code": form.code.trim(),
            "departmentId": form.department_id.trim(),
        });
        if let Some(n) = form.duration_semesters {
            body["durationSemesters"] = json!(n);
        }
        if !form.description.trim().is_empty() {
            body["description"] = json!(form.description.trim());
        }
        let url = api.admin_endpoint("api/academics/programs");
        match api.post_json(&url, &session.token, &body) {
            Ok(resp_body) => unwrap_detail_payload(resp_body),
            Err(e) => return helpers::api_error(&req.id, &e),
        }
    };

    ok(&req.id, json!({ "created": created }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.detail" => Some(handle_detail(state, req, "courses", "course")),
        "departments.detail" => Some(handle_detail(state, req, "departments", "department")),
        "programs.detail" => Some(handle_detail(state, req, "programs", "program")),
        "programs.create" => Some(handle_program_create(state, req)),
        _ => None,
    }
}
