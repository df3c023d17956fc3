use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pixel buffer: {message}")]
    InvalidBuffer { message: String },

    #[error("Cannot compute brightness statistics from an empty sample")]
    EmptySample,

    #[error("Invalid sensitivity {value}: must be a finite number >= 0")]
    InvalidSensitivity { value: f64 },

    #[error("No blank space has been sampled yet")]
    BackgroundNotSampled,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Worker task failed: {message}")]
    Task { message: String },
}

impl From<toml::de::Error> for TraceError {
    fn from(err: toml::de::Error) -> Self {
        TraceError::Config {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
