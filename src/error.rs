use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to load config '{path}': {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("Unknown data source: {0}")]
    SourceNotFound(String),

    #[error("HTTP request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        // Reader-side I/O failures stay I/O; everything else is malformed content.
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => EtlError::Io(io),
                other => EtlError::Parse(format!("{:?}", other)),
            }
        } else {
            EtlError::Parse(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
