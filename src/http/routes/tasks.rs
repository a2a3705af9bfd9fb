// SPDX-License-Identifier: MIT
// http/routes/tasks.rs — Task CRUD routes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::store::Task;
use crate::AppContext;

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 140;

#[derive(Deserialize)]
pub struct ListQuery {
    q: Option<String>,
}

/// GET /tasks — all tasks, optionally filtered with `?q=` (case-insensitive
/// substring match on the title).
pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Task>> {
    let mut tasks = ctx.store.list();

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        tasks.retain(|t| t.title.to_lowercase().contains(&needle));
    }

    Json(tasks)
}

#[derive(Deserialize)]
struct CreateTaskRequest {
    title: String,
}

/// POST /tasks — body `{"title": string}`.
pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    require_json(&headers)?;
    let req: CreateTaskRequest = decode_body(&body)?;
    let title = validate_title(&req.title)?;

    let task = ctx.store.create(title);
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let task = ctx.store.get(id)?;
    Ok(Json(task))
}

#[derive(Deserialize)]
struct PatchTaskRequest {
    done: Option<bool>,
}

/// PATCH /tasks/{id} — body `{"done": bool}`.
pub async fn patch_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    require_json(&headers)?;
    let id = parse_id(&id)?;
    let req: PatchTaskRequest = decode_body(&body)?;
    let done = req
        .done
        .ok_or_else(|| ApiError::bad_request("missing field done"))?;

    let task = ctx.store.update_done(id, done)?;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    ctx.store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Input validation ─────────────────────────────────────────────────────────

/// An absent or empty Content-Type is accepted; anything else must include
/// `application/json`.
fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if value.is_empty() || value.contains("application/json") {
        Ok(())
    } else {
        Err(ApiError::bad_request("Content-Type must be application/json"))
    }
}

fn decode_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("invalid json: {e}")))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("invalid id"))
}

/// Trim the title and enforce the 3–140 character bounds.
fn validate_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    let len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(ApiError::unprocessable(
            "title length must be between 3 and 140 characters",
        ));
    }
    Ok(title.to_string())
}
