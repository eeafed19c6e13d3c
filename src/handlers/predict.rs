//! The two prediction entry points: the HTML form flow and the JSON API.

use crate::AppState;
use crate::error::AppError;
use crate::models::{FeatureRecord, PredictRequest};
use crate::services::metrics::record_prediction;
use anyhow::anyhow;
use askama::Template;
use axum::{
    Form, Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub result: Option<String>,
    pub error: Option<String>,
}

/// GET /predictdata — the empty form page.
pub async fn predict_page() -> impl IntoResponse {
    HomeTemplate {
        result: None,
        error: None,
    }
}

/// POST /predictdata — form flow. Errors re-render the form page with a
/// visible banner instead of escaping as a framework failure.
pub async fn predict_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let outcome = match FeatureRecord::from_form(&fields) {
        Ok(record) => run_prediction(&state, &record).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(prediction) => {
            record_prediction("form", "ok");
            HomeTemplate {
                result: Some(format!("{:.2}", prediction)),
                error: None,
            }
            .into_response()
        }
        Err(err) => {
            record_prediction("form", outcome_label(&err));
            tracing::warn!(error = %err, "Form prediction failed");
            (
                err.status(),
                HomeTemplate {
                    result: None,
                    error: Some(err.public_message()),
                },
            )
                .into_response()
        }
    }
}

/// POST /predict — JSON flow.
pub async fn predict_api(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = predict_json(&state, payload).await;
    match &result {
        Ok(_) => record_prediction("json", "ok"),
        Err(err) => record_prediction("json", outcome_label(err)),
    }
    result
}

async fn predict_json(
    state: &AppState,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::BadRequest(anyhow!(rejection.body_text())))?;
    let record = request.into_record()?;
    let prediction = run_prediction(state, &record).await?;
    Ok(Json(serde_json::json!({ "prediction": prediction })))
}

async fn run_prediction(state: &AppState, record: &FeatureRecord) -> Result<f64, AppError> {
    let pipeline = state.pipeline().await?;
    Ok(pipeline.predict_one(record)?)
}

fn outcome_label(err: &AppError) -> &'static str {
    if err.status().is_client_error() {
        "client_error"
    } else {
        "pipeline_error"
    }
}
