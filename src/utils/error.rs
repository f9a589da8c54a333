// src/utils/error.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type CmsResult<T> = Result<T, CmsError>;

/// Custom error details for additional context
pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Main error type for the content service.
///
/// Every error carries the HTTP status it maps to at the routing edge, so
/// handlers never have to re-classify failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsError {
    pub message: String,
    pub details: Option<Box<ErrorDetails>>,
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    Internal,
    MalformedInput,
    Unauthorized,
    Validation,
    Storage,
    Network,
    Upstream,
    Configuration,
}

impl fmt::Display for CmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CmsError {}

impl CmsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(Box::new(details));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
            .with_status(400)
            .with_code("MALFORMED_INPUT")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
            .with_status(401)
            .with_code("UNAUTHORIZED")
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
            .with_status(500)
            .with_code("STORAGE_ERROR")
    }

    pub fn network_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Network, message)
            .with_status(503)
            .with_code("NETWORK_ERROR")
    }

    /// An upstream API answered with a non-success status. The status is kept
    /// verbatim so it can be handed back to the caller unchanged.
    pub fn upstream_error(status: u16, message: impl Into<String>) -> Self {
        let mut details = ErrorDetails::new();
        details.insert(
            "upstream_status".to_string(),
            serde_json::Value::from(status),
        );

        Self::new(ErrorKind::Upstream, message)
            .with_details(details)
            .with_status(status)
            .with_code("UPSTREAM_ERROR")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn internal_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Internal, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }

    /// HTTP status to answer with, falling back to 500.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    pub fn is_malformed_input(&self) -> bool {
        self.kind == ErrorKind::MalformedInput
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::malformed_input(format!("Invalid JSON: {}", err))
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CmsError::upstream_error(status.as_u16(), err.to_string())
        } else {
            CmsError::network_error(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<url::ParseError> for CmsError {
    fn from(err: url::ParseError) -> Self {
        CmsError::config_error(format!("Invalid URL: {}", err))
    }
}

impl From<worker::Error> for CmsError {
    fn from(err: worker::Error) -> Self {
        CmsError::internal_error(format!("Worker error: {}", err))
    }
}

impl From<CmsError> for worker::Error {
    fn from(err: CmsError) -> Self {
        worker::Error::RustError(err.message)
    }
}
