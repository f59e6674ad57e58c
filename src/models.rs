use serde::{Deserialize, Serialize};
use serde_json::Value;

// Record shapes are owned by the backends. Decode leniently: unknown fields
// are ignored, absent fields fall back to defaults, and nothing beyond the
// fields used by filter predicates and statistics is validated.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantRef {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ApplicantRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub submitted_at: String,
    pub applicant: ApplicantRef,
    pub program: ProgramRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Applicant {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gpa: Option<f64>,
    pub registered: bool,
    pub cohort_id: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cohort {
    pub id: String,
    pub name: String,
    pub code: String,
    pub start_date: String,
    pub end_date: String,
    pub program_id: Option<String>,
    pub student_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
}

/// Items plus the total the server advertises, when it advertises one.
#[derive(Debug, Clone)]
pub struct ListPayload {
    pub items: Vec<Value>,
    pub total: Option<u64>,
}

/// Collection endpoints answer in three shapes, inconsistently per page:
/// a bare array, `{data: [...], total, page, limit}`, or
/// `{meta: {page, limit, total}, data: [...]}`. Normalize all of them.
pub fn decode_list_payload(body: Value) -> Result<ListPayload, String> {
    if let Value::Array(items) = body {
        return Ok(ListPayload { items, total: None });
    }

    let Value::Object(map) = body else {
        return Err("collection response is neither an array nor an object".to_string());
    };

    let total = map
        .get("total")
        .and_then(Value::as_u64)
        .or_else(|| map.get("meta").and_then(|m| m.get("total")).and_then(Value::as_u64));

    match map.get("data") {
        Some(Value::Array(items)) => Ok(ListPayload {
            items: items.clone(),
            total,
        }),
        Some(_) => Err("collection response field 'data' is not an array".to_string()),
        None => Err("collection response has no 'data' array".to_string()),
    }
}

/// Some detail endpoints wrap the record in `{data: {...}}`, others return
/// it bare. Unwrap one level of `data` when present.
pub fn unwrap_detail_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => other,
            None => Value::Object(map),
        },
        other => other,
    }
}

pub fn decode_records<R: serde::de::DeserializeOwned>(items: Vec<Value>) -> Result<Vec<R>, String> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let record =
            serde_json::from_value(item).map_err(|e| format!("record {} undecodable: {}", i, e))?;
        out.push(record);
    }
    Ok(out)
}

/// Timestamps arrive either as RFC 3339 or as a bare `YYYY-MM-DD` date.
/// Returns a comparable instant, or `None` for anything unparseable.
pub fn parse_wire_date(raw: &str) -> Option<chrono::NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
