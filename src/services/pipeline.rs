//! Artifact-backed prediction pipeline.
//!
//! The artifact is a JSON document produced by the training side: per-column
//! category vocabularies with one weight per category, standardization
//! parameters and a weight per numeric column, and an intercept. Inference is
//! a data-driven evaluation of that document; nothing here depends on the
//! model having any particular column set beyond what the artifact declares.

use crate::models::FeatureRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("model artifact not found at {path}: {source}")]
    ArtifactMissing {
        path: String,
        source: std::io::Error,
    },

    #[error("model artifact is malformed: {0}")]
    ArtifactMalformed(#[from] serde_json::Error),

    #[error("artifact column {column:?} has {categories} categories but {weights} weights")]
    ArityMismatch {
        column: String,
        categories: usize,
        weights: usize,
    },

    #[error("artifact references {column:?}, which is not a feature column")]
    UnknownColumn { column: String },

    #[error("unknown value {value:?} for {column}")]
    UnknownCategory { column: String, value: String },
}

#[derive(Debug, Deserialize)]
struct NumericColumn {
    name: String,
    mean: f64,
    std: f64,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct CategoricalColumn {
    name: String,
    categories: Vec<String>,
    weights: Vec<f64>,
}

/// Deserialized model artifact: a linear regression over one-hot encoded
/// categoricals and standard-scaled numeric scores.
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    target: String,
    intercept: f64,
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
}

/// Loaded, validated pipeline. Immutable after construction and safe to
/// share across concurrent requests.
#[derive(Debug)]
pub struct PredictPipeline {
    artifact: ModelArtifact,
}

impl PredictPipeline {
    /// Load and validate the artifact at `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        let raw = tokio::fs::read_to_string(&path).await.map_err(|source| {
            PipelineError::ArtifactMissing {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::from_json(&raw, &path)
    }

    fn from_json(raw: &str, path: &Path) -> Result<Self, PipelineError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;

        for column in &artifact.categorical {
            if column.categories.len() != column.weights.len() {
                return Err(PipelineError::ArityMismatch {
                    column: column.name.clone(),
                    categories: column.categories.len(),
                    weights: column.weights.len(),
                });
            }
            if !FeatureRecord::CATEGORICAL_COLUMNS.contains(&column.name.as_str()) {
                return Err(PipelineError::UnknownColumn {
                    column: column.name.clone(),
                });
            }
        }
        for column in &artifact.numeric {
            if !FeatureRecord::NUMERIC_COLUMNS.contains(&column.name.as_str()) {
                return Err(PipelineError::UnknownColumn {
                    column: column.name.clone(),
                });
            }
        }

        tracing::info!(
            path = %path.display(),
            target = %artifact.target,
            categorical_columns = artifact.categorical.len(),
            numeric_columns = artifact.numeric.len(),
            "Model artifact loaded"
        );

        Ok(Self { artifact })
    }

    /// Predict one scalar per record, in input order.
    pub fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError> {
        records.iter().map(|r| self.predict_record(r)).collect()
    }

    /// Convenience wrapper for the one-record-per-request call sites.
    pub fn predict_one(&self, record: &FeatureRecord) -> Result<f64, PipelineError> {
        self.predict_record(record)
    }

    fn predict_record(&self, record: &FeatureRecord) -> Result<f64, PipelineError> {
        let mut score = self.artifact.intercept;

        for column in &self.artifact.categorical {
            // Column names were validated against the record shape at load.
            let value = record
                .categorical(&column.name)
                .expect("categorical column validated at load");
            let index = column
                .categories
                .iter()
                .position(|c| c == value)
                .ok_or_else(|| PipelineError::UnknownCategory {
                    column: column.name.clone(),
                    value: value.to_string(),
                })?;
            score += column.weights[index];
        }

        for column in &self.artifact.numeric {
            let value = record
                .numeric(&column.name)
                .expect("numeric column validated at load");
            score += column.weight * ((value - column.mean) / column.std);
        }

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_artifact() -> String {
        serde_json::json!({
            "target": "math_score",
            "intercept": 10.0,
            "numeric": [
                { "name": "reading_score", "mean": 70.0, "std": 10.0, "weight": 2.0 },
                { "name": "writing_score", "mean": 70.0, "std": 10.0, "weight": 3.0 }
            ],
            "categorical": [
                { "name": "gender", "categories": ["female", "male"], "weights": [-1.0, 1.0] },
                { "name": "race_ethnicity", "categories": ["group A", "group B"], "weights": [0.5, -0.5] },
                { "name": "parental_level_of_education", "categories": ["high school"], "weights": [0.0] },
                { "name": "lunch", "categories": ["standard"], "weights": [0.25] },
                { "name": "test_preparation_course", "categories": ["none"], "weights": [0.0] }
            ]
        })
        .to_string()
    }

    fn record() -> FeatureRecord {
        FeatureRecord {
            gender: "male".to_string(),
            race_ethnicity: "group B".to_string(),
            parental_level_of_education: "high school".to_string(),
            lunch: "standard".to_string(),
            test_preparation_course: "none".to_string(),
            reading_score: 80.0,
            writing_score: 60.0,
        }
    }

    #[test]
    fn prediction_is_linear_in_the_artifact() {
        let pipeline =
            PredictPipeline::from_json(&test_artifact(), Path::new("test.json")).unwrap();
        let got = pipeline.predict_one(&record()).unwrap();
        // 10 + 1 - 0.5 + 0 + 0.25 + 0 + 2*(80-70)/10 + 3*(60-70)/10
        assert!((got - 9.75).abs() < 1e-9);
    }

    #[test]
    fn prediction_is_deterministic() {
        let pipeline =
            PredictPipeline::from_json(&test_artifact(), Path::new("test.json")).unwrap();
        let a = pipeline.predict_one(&record()).unwrap();
        let b = pipeline.predict_one(&record()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_preserves_input_order() {
        let pipeline =
            PredictPipeline::from_json(&test_artifact(), Path::new("test.json")).unwrap();
        let mut second = record();
        second.gender = "female".to_string();
        let got = pipeline.predict(&[record(), second.clone()]).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], pipeline.predict_one(&record()).unwrap());
        assert_eq!(got[1], pipeline.predict_one(&second).unwrap());
    }

    #[test]
    fn unknown_category_is_a_distinguishable_error() {
        let pipeline =
            PredictPipeline::from_json(&test_artifact(), Path::new("test.json")).unwrap();
        let mut bad = record();
        bad.lunch = "gourmet".to_string();
        let err = pipeline.predict_one(&bad).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownCategory { ref column, .. } if column == "lunch"
        ));
    }

    #[test]
    fn arity_mismatch_is_rejected_at_load() {
        let raw = serde_json::json!({
            "target": "math_score",
            "intercept": 0.0,
            "numeric": [],
            "categorical": [
                { "name": "gender", "categories": ["female", "male"], "weights": [1.0] }
            ]
        })
        .to_string();
        let err = PredictPipeline::from_json(&raw, Path::new("test.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ArityMismatch { .. }));
    }

    #[test]
    fn unknown_column_is_rejected_at_load() {
        let raw = serde_json::json!({
            "target": "math_score",
            "intercept": 0.0,
            "numeric": [
                { "name": "shoe_size", "mean": 0.0, "std": 1.0, "weight": 1.0 }
            ],
            "categorical": []
        })
        .to_string();
        let err = PredictPipeline::from_json(&raw, Path::new("test.json")).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn { .. }));
    }

    #[test]
    fn malformed_artifact_is_rejected() {
        let err = PredictPipeline::from_json("{not json", Path::new("test.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMalformed(_)));
    }

    #[tokio::test]
    async fn missing_artifact_reports_the_path() {
        let err = PredictPipeline::load("/nonexistent/artifact.json")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMissing { .. }));
        assert!(err.to_string().contains("/nonexistent/artifact.json"));
    }
}
