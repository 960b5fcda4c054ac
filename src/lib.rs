pub mod data;
pub mod error;
pub mod ingest;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod report;

pub use data::config::{AnalysisConfig, DatasetConfig};
pub use data::domain::{Network, TamJoinMode};
pub use pipeline::AnalysisPipeline;
