use serde_json::{json, Value};

use crate::api::ApiError;
use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::session::Session;

/// Data ops need a connected backend and a session, in that order.
pub fn ensure_ready(state: &AppState, id: &str) -> Option<Value> {
    if state.api.is_none() {
        return Some(err(id, "no_backend", "call backend.connect first", None));
    }
    if state.session.is_none() {
        return Some(err(id, "no_session", "call session.login first", None));
    }
    None
}

/// Map a client error onto the IPC envelope. 404s get their own code so
/// the shell can tell "gone" from "broken".
pub fn api_error(id: &str, e: &ApiError) -> Value {
    let code = if e.is_not_found() {
        "not_found"
    } else {
        e.code.as_str()
    };
    let details = e.status.map(|s| json!({ "httpStatus": s }));
    err(id, code, e.message.clone(), details)
}

/// What the shell may know about the session. Never the raw token.
pub fn session_json(session: &Session) -> Value {
    json!({
        "user": session.user_name.clone(),
        "role": session.role.as_str(),
        "tokenFingerprint": session.token_fingerprint(),
    })
}

/// Dropdown-dimension param: absent, null, "" and "ALL" all clear it.
/// Anything non-string is a caller bug.
pub fn select_param(params: &Value, key: &str) -> Result<Option<String>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("all") {
                Ok(None)
            } else {
                Ok(Some(t.to_string()))
            }
        }
        Some(_) => Err(format!("{} must be a string", key)),
    }
}

pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
