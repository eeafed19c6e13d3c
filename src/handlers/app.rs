use askama::Template;
use axum::{Json, response::IntoResponse};
use serde_json::json;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}

/// Liveness probe. Never touches the prediction pipeline, so it stays green
/// even when the model artifact is missing.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
