use thiserror::Error;

pub type LvrLabResult<T> = Result<T, LvrLabError>;

#[derive(Debug, Error)]
pub enum LvrLabError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors raised while validating dataset or analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Data directory not found: {0}")]
    DataDirNotFound(String),

    #[error("Invalid analysis config: {0}")]
    InvalidAnalysisConfig(String),
}

/// Errors related to data loading, cleaning, and frame operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Failed timestamp conversion: {0}")]
    TimestampConversion(String),
}

/// Errors related to file I/O and serialization.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Failed to create writer: {0}")]
    WriterCreation(String),

    #[error("Failed to read data: {0}")]
    ReadFailed(String),
}
