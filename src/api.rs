//! Blocking HTTP client for the admin and news backends. Every call is a
//! single attempt; retry policy belongs to whoever drives the IPC surface.

use std::fmt::{Display, Formatter};

use reqwest::blocking::Client;
use serde_json::Value;

use crate::models::{decode_list_payload, ListPayload};

/// Upstream page size used when crawling a listing to completion.
const FETCH_PAGE_LIMIT: usize = 100;
/// Hard stop for the crawl so a confused backend cannot spin us forever.
const MAX_FETCH_PAGES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    Url,
    Network,
    HttpStatus,
    Decode,
}

impl ApiErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::Decode => "decode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// Set for `HttpStatus` errors so callers can special-case 404 and 403.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    fn http(status: u16, detail: Option<String>) -> Self {
        let message = match detail {
            Some(d) => format!("HTTP {}: {}", status, d),
            None => format!("HTTP {}", status),
        };
        Self {
            code: ApiErrorCode::HttpStatus,
            message,
            status: Some(status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Parse and normalize a backend base URL. Only http(s) URLs with a host
/// are accepted; the trailing slash is dropped so joining stays uniform.
pub fn validate_base_url(raw: &str) -> Result<String, ApiError> {
    let parsed = reqwest::Url::parse(raw.trim())
        .map_err(|e| ApiError::new(ApiErrorCode::Url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::new(
                ApiErrorCode::Url,
                format!("unsupported scheme {:?}", other),
            ))
        }
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::new(ApiErrorCode::Url, "missing host"));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

pub struct ApiClient {
    admin_url: String,
    news_url: String,
    http: Client,
}

impl ApiClient {
    /// Calls are single attempts with no retry and no configured timeout;
    /// the stack defaults stand.
    pub fn new(admin_url: &str, news_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            admin_url: validate_base_url(admin_url)?,
            news_url: validate_base_url(news_url)?,
            http: Client::builder()
                .build()
                .map_err(|e| ApiError::new(ApiErrorCode::Network, e.to_string()))?,
        })
    }

    pub fn admin_url(&self) -> &str {
        &self.admin_url
    }

    pub fn news_url(&self) -> &str {
        &self.news_url
    }

    pub fn admin_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.admin_url, path.trim_start_matches('/'))
    }

    pub fn news_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.news_url, path.trim_start_matches('/'))
    }

    fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        log::debug!("{} {} request-id={}", method, url, request_id);
        let mut req = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .header("X-Request-Id", &request_id);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().map_err(|e| {
            // The URL carries no credentials, so it is safe to log.
            log::warn!("{} {} failed to send: {}", method, url, e);
            ApiError::new(ApiErrorCode::Network, e.to_string())
        })?;

        let status = resp.status();
        let text = resp.text().map_err(|e| {
            log::warn!("{} {} body unreadable: {}", method, url, e);
            ApiError::new(ApiErrorCode::Network, e.to_string())
        })?;

        if !status.is_success() {
            log::warn!("{} {} -> HTTP {}", method, url, status.as_u16());
            let detail = extract_server_message(&text);
            return Err(ApiError::http(status.as_u16(), detail));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            log::warn!("{} {} returned undecodable body: {}", method, url, e);
            ApiError::new(ApiErrorCode::Decode, e.to_string())
        })
    }

    pub fn get_json(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        self.send(reqwest::Method::GET, url, token, None)
    }

    pub fn post_json(&self, url: &str, token: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(reqwest::Method::POST, url, token, Some(body))
    }

    pub fn put_json(&self, url: &str, token: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(reqwest::Method::PUT, url, token, Some(body))
    }

    pub fn patch_json(&self, url: &str, token: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(reqwest::Method::PATCH, url, token, Some(body))
    }

    pub fn delete(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        self.send(reqwest::Method::DELETE, url, token, None)
    }

    /// Crawl a paged listing to completion: page 1, 2, ... at
    /// `limit=FETCH_PAGE_LIMIT`, concatenating in order until the advertised
    /// total is reached or a short page signals the end.
    pub fn fetch_all_pages(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<ListPayload, ApiError> {
        let mut items: Vec<Value> = Vec::new();
        let mut advertised: Option<u64> = None;

        for page in 1..=MAX_FETCH_PAGES {
            let mut url = reqwest::Url::parse(endpoint)
                .map_err(|e| ApiError::new(ApiErrorCode::Url, e.to_string()))?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                pairs.append_pair("page", &page.to_string());
                pairs.append_pair("limit", &FETCH_PAGE_LIMIT.to_string());
            }

            let body = self.get_json(url.as_str(), token)?;
            let payload = decode_list_payload(body)
                .map_err(|m| ApiError::new(ApiErrorCode::Decode, m))?;

            let page_len = payload.items.len();
            items.extend(payload.items);
            if payload.total.is_some() {
                advertised = payload.total;
            }

            if let Some(total) = advertised {
                if items.len() as u64 >= total {
                    break;
                }
            }
            if page_len < FETCH_PAGE_LIMIT {
                break;
            }
        }

        let total = advertised.unwrap_or(items.len() as u64);
        Ok(ListPayload {
            items,
            total: Some(total),
        })
    }
}

/// Backends wrap error text as `{"message": "..."}` or `{"error": "..."}`;
/// fall back to a trimmed snippet of the raw body.
fn extract_server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }
    let snippet: String = trimmed.chars().take(200).collect();
    Some(snippet)
}
