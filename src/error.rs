use thiserror::Error;

use crate::fetch::{ErrorKind, FetchError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream http error: {0}")]
    UpstreamHttp(String),
    #[error("upstream schema changed: {0}")]
    UpstreamSchema(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Precondition(_) => "PRECONDITION",
            Self::Network(_) => "NETWORK",
            Self::UpstreamHttp(_) => "UPSTREAM_HTTP",
            Self::UpstreamSchema(_) => "UPSTREAM_SCHEMA",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Database(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        match value.kind {
            ErrorKind::Precondition => Self::Precondition(value.message),
            ErrorKind::NonRetryable => Self::Network(value.message),
            ErrorKind::HttpError | ErrorKind::ProxyHttpError => Self::UpstreamHttp(value.message),
            ErrorKind::Parse => Self::UpstreamSchema(value.message),
        }
    }
}
