use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no usable face encoding: {message}")]
    InvalidEncoding { message: String },

    #[error("principal '{principal}' has no enrolled face; register first")]
    NotRegistered { principal: String },

    #[error("encoding length mismatch: expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("face service request failed: {message}")]
    TransportFailure { message: String },

    #[error("recognized identity '{recognized}' does not own resource '{requested}'")]
    AuthorizationMismatch {
        requested: String,
        recognized: String,
    },

    #[error("no encoding stored for principal '{principal}'")]
    NotFound { principal: String },

    #[error("invalid principal id '{principal}': {message}")]
    InvalidPrincipal { principal: String, message: String },

    #[error("similarity threshold must be in (0, 1], found {value}")]
    InvalidThreshold { value: f64 },

    #[error("failed to read encoding store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write encoding store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding store {path} is invalid: {message}")]
    InvalidStoreFile { path: PathBuf, message: String },

    #[error("failed to read face service response {path}: {source}")]
    ResponseRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("face service response {path} is invalid: {message}")]
    InvalidResponse { path: PathBuf, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::InvalidEncoding { .. } => ExitCode::from(2),
            AppError::LengthMismatch { .. } => ExitCode::from(2),
            AppError::InvalidPrincipal { .. } => ExitCode::from(2),
            AppError::InvalidStoreFile { .. } => ExitCode::from(2),
            AppError::ResponseRead { .. } => ExitCode::from(2),
            AppError::InvalidResponse { .. } => ExitCode::from(2),
            AppError::ConfigRead { .. } => ExitCode::from(2),
            AppError::ConfigParse { .. } => ExitCode::from(2),
            AppError::InvalidThreshold { .. } => ExitCode::from(2),
            AppError::TransportFailure { .. } => ExitCode::from(3),
            AppError::NotRegistered { .. } => ExitCode::from(4),
            AppError::NotFound { .. } => ExitCode::from(4),
            AppError::AuthorizationMismatch { .. } => ExitCode::from(5),
            _ => ExitCode::from(1),
        }
    }

    pub fn human_message(&self) -> String {
        self.to_string()
    }

    pub fn invalid_encoding(message: impl Into<String>) -> Self {
        AppError::InvalidEncoding {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        AppError::TransportFailure {
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
