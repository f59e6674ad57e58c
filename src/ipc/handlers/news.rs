use crate::forms::NewsForm;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::models::{decode_list_payload, decode_records, unwrap_detail_payload, NewsArticle};
use serde_json::{json, Value};

fn fetch_records(state: &AppState) -> Result<Vec<NewsArticle>, String> {
    let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
        return Err("backend not connected".to_string());
    };
    let endpoint = api.news_endpoint("api/news");
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
    let seq = state.news.view.begin_fetch();
    let outcome = fetch_records(state);
    state.news.view.complete_fetch(seq, outcome);
    None
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.news.reset();
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.news.view_model())
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(&req.id, state.news.view_model())
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(term) = req.params.get("term").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing term", None);
    };
    state.news.filters.search = term.trim().to_string();
    state.news.view.page.reset();
    ok(&req.id, state.news.view_model())
}

fn handle_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(page) = req.params.get("page").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing page", None);
    };
    state.news.view.page.go_to_page(page);
    ok(&req.id, state.news.view_model())
}

fn handle_page_size(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(size) = req.params.get("size").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing size", None);
    };
    if let Err(m) = state.news.view.page.set_items_per_page(size as usize) {
        return err(&req.id, "bad_params", m, None);
    }
    ok(&req.id, state.news.view_model())
}

/// Pluck and shape-check the news form fields shared by create and update.
fn news_form(req: &Request) -> Result<NewsForm, serde_json::Value> {
    let Some(title) = req.params.get("title").and_then(|v| v.as_str()) else {
        return Err(err(&req.id, "bad_params", "missing title", None));
    };
    let Some(content) = req.params.get("content").and_then(|v| v.as_str()) else {
        return Err(err(&req.id, "bad_params", "missing content", None));
    };
    let tags = match req.params.get("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut tags = Vec::with_capacity(items.len());
            for item in items {
                let Some(tag) = item.as_str() else {
                    return Err(err(
                        &req.id,
                        "bad_params",
                        "tags must be an array of strings",
                        None,
                    ));
                };
                tags.push(tag.trim().to_string());
            }
            tags
        }
        Some(_) => {
            return Err(err(
                &req.id,
                "bad_params",
                "tags must be an array of strings",
                None,
            ))
        }
    };

    let form = NewsForm {
        title: title.to_string(),
        content: content.to_string(),
        tags,
    };
    let violations = form.validate();
    if !violations.is_empty() {
        return Err(err(
            &req.id,
            "validation_failed",
            "news form is invalid",
            Some(json!({ "violations": violations })),
        ));
    }
    Ok(form)
}

fn form_body(form: &NewsForm) -> Value {
    json!({
        "title": form.title.trim(),
        "content": form.content.trim(),
        "tags": form.tags,
    })
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let form = match news_form(req) {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    let created = {
        let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
            return err(&req.id, "no_backend", "call backend.connect first", None);
        };
        let url = api.news_endpoint("api/news");
        match api.post_json(&url, &session.token, &form_body(&form)) {
            Ok(body) => unwrap_detail_payload(body),
            Err(e) => return helpers::api_error(&req.id, &e),
        }
    };

    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(
        &req.id,
        json!({ "created": created, "view": state.news.view_model() }),
    )
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let Some(article_id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    let form = match news_form(req) {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    let updated = {
        let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
            return err(&req.id, "no_backend", "call backend.connect first", None);
        };
        let url = api.news_endpoint(&format!("api/news/{}", article_id));
        match api.put_json(&url, &session.token, &form_body(&form)) {
            Ok(body) => unwrap_detail_payload(body),
            Err(e) => return helpers::api_error(&req.id, &e),
        }
    };

    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(
        &req.id,
        json!({ "updated": updated, "view": state.news.view_model() }),
    )
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = helpers::ensure_ready(state, &req.id) {
        return resp;
    }
    let article_id = match req.params.get("id").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing id", None),
    };

    {
        let (Some(api), Some(session)) = (state.api.as_ref(), state.session.as_ref()) else {
            return err(&req.id, "no_backend", "call backend.connect first", None);
        };
        let url = api.news_endpoint(&format!("api/news/{}", article_id));
        if let Err(e) = api.delete(&url, &session.token) {
            return helpers::api_error(&req.id, &e);
        }
    }

    if let Some(resp) = refetch(state, &req.id) {
        return resp;
    }
    ok(
        &req.id,
        json!({ "deleted": article_id, "view": state.news.view_model() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "news.open" => Some(handle_open(state, req)),
        "news.refresh" => Some(handle_refresh(state, req)),
        "news.search" => Some(handle_search(state, req)),
        "news.page" => Some(handle_page(state, req)),
        "news.pageSize" => Some(handle_page_size(state, req)),
        "news.create" => Some(handle_create(state, req)),
        "news.update" => Some(handle_update(state, req)),
        "news.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
