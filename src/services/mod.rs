pub mod metrics;
pub mod pipeline;

pub use metrics::{get_metrics, init_metrics};
pub use pipeline::{PipelineError, PredictPipeline};
