use std::path::PathBuf;
use thiserror::Error;

/// Main error type for apiscan operations
#[derive(Error, Debug)]
pub enum ApiScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load catalog {path}: {message}")]
    CatalogLoad { path: PathBuf, message: String },

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Target directory does not exist: {0}")]
    TargetNotFound(PathBuf),

    #[error("Failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ApiScanError>;
