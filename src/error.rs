use polars::prelude::PolarsError;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid PWM format: {0}")]
    InvalidPwm(String),

    #[error("Factor {factor} not found in {path}")]
    FactorNotFound { factor: String, path: String },

    #[error("No sequence found in {0}")]
    EmptySequence(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, SamplerError>;

impl SamplerError {
    /// Create a new InvalidFileFormat error pointing at a 1-based line of `path`
    pub fn malformed_line(path: &Path, line: usize, message: impl AsRef<str>) -> Self {
        SamplerError::InvalidFileFormat(format!(
            "{}:{}: {}",
            path.display(),
            line,
            message.as_ref()
        ))
    }

    /// Create a new InvalidPwm error
    pub fn invalid_pwm(message: impl Into<String>) -> Self {
        SamplerError::InvalidPwm(message.into())
    }

    /// Create a new FactorNotFound error
    pub fn factor_not_found(factor: impl Into<String>, path: &Path) -> Self {
        SamplerError::FactorNotFound {
            factor: factor.into(),
            path: path.display().to_string(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        SamplerError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Create a new Model error
    pub fn model(message: impl Into<String>) -> Self {
        SamplerError::Model(message.into())
    }
}
