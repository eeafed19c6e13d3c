//! Test helper module for score-service integration tests.

#![allow(dead_code)]

use score_service::config::{ModelSettings, ServerSettings, Settings};
use score_service::services::init_metrics;
use score_service::startup::Application;

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the application on a random port with the shipped artifact.
    pub async fn spawn() -> Self {
        Self::spawn_with_artifact("model/artifact.json").await
    }

    /// Spawn the application on a random port using `artifact_path`.
    pub async fn spawn_with_artifact(artifact_path: &str) -> Self {
        // Initialize metrics (required for metrics endpoint test)
        init_metrics();

        let config = Settings {
            service_name: "score-service-test".to_string(),
            log_level: "warn".to_string(),
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            model: ModelSettings {
                artifact_path: artifact_path.to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let port = app.port();

        tokio::spawn(app.run_until_stopped());

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}

/// The canonical JSON request body from the API documentation.
pub fn canonical_request() -> serde_json::Value {
    serde_json::json!({
        "gender": "male",
        "ethnicity": "group B",
        "parental_level_of_education": "bachelor's degree",
        "lunch": "standard",
        "test_preparation_course": "none",
        "reading_score": 72,
        "writing_score": 70
    })
}
