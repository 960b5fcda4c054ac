use std::path::PathBuf;

use lvrlab::prelude::*;

pub fn dataset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dataset")
}

pub fn setup_pipeline() -> AnalysisPipeline {
    let dataset = DatasetConfig::new(dataset_dir()).expect("fixture dataset directory exists");
    AnalysisPipeline::new(dataset)
}
