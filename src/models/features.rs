//! The feature record and the two input adapters that build it.

use crate::error::AppError;
use anyhow::anyhow;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

/// The seven-field input to the prediction pipeline. Immutable once built,
/// owned by one request, never persisted.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct FeatureRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub reading_score: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub writing_score: f64,
}

impl FeatureRecord {
    pub const CATEGORICAL_COLUMNS: [&'static str; 5] = [
        "gender",
        "race_ethnicity",
        "parental_level_of_education",
        "lunch",
        "test_preparation_course",
    ];

    pub const NUMERIC_COLUMNS: [&'static str; 2] = ["reading_score", "writing_score"];

    /// Look up a categorical field by its column name.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "gender" => Some(&self.gender),
            "race_ethnicity" => Some(&self.race_ethnicity),
            "parental_level_of_education" => Some(&self.parental_level_of_education),
            "lunch" => Some(&self.lunch),
            "test_preparation_course" => Some(&self.test_preparation_course),
            _ => None,
        }
    }

    /// Look up a numeric field by its column name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "reading_score" => Some(self.reading_score),
            "writing_score" => Some(self.writing_score),
            _ => None,
        }
    }

    /// Build a record from a posted form. The form names the race field
    /// `ethnicity`; the record names it `race_ethnicity`. Missing keys and
    /// non-numeric scores are client errors.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, AppError> {
        let field = |name: &str| -> Result<String, AppError> {
            form.get(name)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| AppError::BadRequest(anyhow!("missing form field: {}", name)))
        };
        let score = |name: &str| -> Result<f64, AppError> {
            field(name)?.parse::<f64>().map_err(|_| {
                AppError::BadRequest(anyhow!("form field {} must be a number", name))
            })
        };

        let record = FeatureRecord {
            gender: field("gender")?,
            race_ethnicity: field("ethnicity")?,
            parental_level_of_education: field("parental_level_of_education")?,
            lunch: field("lunch")?,
            test_preparation_course: field("test_preparation_course")?,
            reading_score: score("reading_score")?,
            writing_score: score("writing_score")?,
        };
        record.validate()?;
        Ok(record)
    }
}

/// JSON body for POST /predict. The wire key for race is `ethnicity`; unknown
/// extra keys are rejected at deserialization, preserving the upstream
/// behavior where unexpected keys fail construction.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    pub gender: String,
    pub ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub reading_score: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub writing_score: f64,
}

impl PredictRequest {
    pub fn into_record(self) -> Result<FeatureRecord, AppError> {
        self.validate()?;
        Ok(FeatureRecord {
            gender: self.gender,
            race_ethnicity: self.ethnicity,
            parental_level_of_education: self.parental_level_of_education,
            lunch: self.lunch,
            test_preparation_course: self.test_preparation_course,
            reading_score: self.reading_score,
            writing_score: self.writing_score,
        })
    }
}
