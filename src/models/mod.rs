pub mod features;

pub use features::{FeatureRecord, PredictRequest};
