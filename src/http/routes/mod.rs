pub mod health;
pub mod tasks;

use axum::response::IntoResponse;

use super::error::ApiError;

/// Router fallback: any path outside the declared routes.
pub async fn invalid_path() -> impl IntoResponse {
    ApiError::not_found("invalid path")
}
