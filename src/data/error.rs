use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading an order dataset. Every variant is fatal
/// for the load that produced it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of order objects")]
    JsonShape,

    #[error("reading parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("converting Arrow column")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: '{value}' is not a valid order date")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: '{value}' is not a valid price")]
    InvalidPrice { row: usize, value: String },
}

pub type Result<T> = std::result::Result<T, DataError>;
