use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid {field}: '{value}' (expected one of: {expected})")]
    Validation {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("Bad data at row {row}: {message}")]
    DataFormat { row: usize, message: String },

    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(field: &'static str, value: &str, expected: &[&str]) -> Self {
        Error::Validation {
            field,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }

    /// Row numbers are 1-based and count data rows only (the header is row 0).
    pub fn data_format(row: usize, message: impl Into<String>) -> Self {
        Error::DataFormat {
            row,
            message: message.into(),
        }
    }
}
