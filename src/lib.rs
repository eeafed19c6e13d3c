pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;

use crate::config::Settings;
use crate::services::pipeline::{PipelineError, PredictPipeline};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Shared application state.
///
/// The pipeline slot is a process-wide lazy singleton: the model artifact is
/// loaded at most once, on the first request that needs it, and shared
/// read-only by every request after that. Concurrent first requests go
/// through `OnceCell::get_or_try_init`, so the artifact is never loaded twice
/// and a partially-initialized pipeline is never observable.
#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pipeline: Arc<OnceCell<PredictPipeline>>,
}

impl AppState {
    pub fn new(config: Settings) -> Self {
        Self {
            config,
            pipeline: Arc::new(OnceCell::new()),
        }
    }

    /// Get the shared prediction pipeline, loading the model artifact on
    /// first use. A failed load is not cached; the next request retries.
    pub async fn pipeline(&self) -> Result<&PredictPipeline, PipelineError> {
        self.pipeline
            .get_or_try_init(|| PredictPipeline::load(self.config.model.artifact_path.clone()))
            .await
    }
}
