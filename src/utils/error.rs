use thiserror::Error;

#[derive(Error, Debug)]
pub enum EoError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Credentials file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Invalid period '{value}'")]
    InvalidPeriodError { value: String },

    #[error("Remote server returned {status} for {url}")]
    RemoteStatusError { status: u16, url: String },

    #[error("Remote job {request_id} failed: {message}")]
    JobFailedError { request_id: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EoError>;

impl EoError {
    pub fn config(message: impl Into<String>) -> Self {
        EoError::ConfigError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        EoError::ProcessingError {
            message: message.into(),
        }
    }
}
