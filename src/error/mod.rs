use std::fmt;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

use crate::storage::StoreError;

/// Coarse error category, the part of an error a transport layer maps on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    InvalidArgument,
    InvalidState,
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Errors returned by the session controller
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("[E{code:04}] Not found: {message}")]
    NotFound { code: u16, message: String },

    #[error("[E{code:04}] Forbidden: {message}")]
    Forbidden { code: u16, message: String },

    #[error("[E{code:04}] Conflict: {message}")]
    Conflict { code: u16, message: String },

    #[error("[E{code:04}] Invalid argument: {message}")]
    InvalidArgument { code: u16, message: String },

    #[error("[E{code:04}] Invalid state: {message}")]
    InvalidState { code: u16, message: String },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        #[source]
        source: Option<StoreError>,
    },
}

impl SessionError {
    pub fn session_not_found(session_id: impl fmt::Display) -> Self {
        Self::NotFound {
            code: ErrorCode::SESSION_NOT_FOUND,
            message: format!("session {session_id} does not exist"),
        }
    }

    pub fn device_not_found(device_id: impl fmt::Display) -> Self {
        Self::NotFound {
            code: ErrorCode::DEVICE_NOT_FOUND,
            message: format!("device {device_id} does not exist"),
        }
    }

    pub fn forbidden(session_id: impl fmt::Display) -> Self {
        Self::Forbidden {
            code: ErrorCode::SESSION_PERMISSION_DENIED,
            message: format!("session {session_id} belongs to another user"),
        }
    }

    pub fn already_active(message: impl Into<String>) -> Self {
        Self::Conflict {
            code: ErrorCode::SESSION_ALREADY_ACTIVE,
            message: message.into(),
        }
    }

    pub fn invalid_argument(code: u16, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            code: ErrorCode::SESSION_INVALID_STATE,
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound { code, .. }
            | Self::Forbidden { code, .. }
            | Self::Conflict { code, .. }
            | Self::InvalidArgument { code, .. }
            | Self::InvalidState { code, .. }
            | Self::Storage { code, .. } => *code,
        }
    }

    /// Message without the code prefix, suitable for API clients
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Conflict { message, .. }
            | Self::InvalidArgument { message, .. }
            | Self::InvalidState { message, .. }
            | Self::Storage { message, .. } => message,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SessionError::session_not_found(id),
            StoreError::ActiveSessionExists { existing } => SessionError::already_active(format!(
                "session {existing} is already active for this device and service"
            )),
            StoreError::StatusMismatch { actual, .. } => {
                SessionError::invalid_state(format!("session is {actual}"))
            }
            other => {
                let code = match &other {
                    StoreError::Io(_) => ErrorCode::STORAGE_IO_ERROR,
                    StoreError::Serialization(_) => ErrorCode::STORAGE_SERIALIZATION_ERROR,
                    StoreError::Corrupted(_) => ErrorCode::STORAGE_CORRUPTED,
                    _ => ErrorCode::STORAGE_GENERIC,
                };
                SessionError::Storage {
                    code,
                    message: other.to_string(),
                    source: Some(other),
                }
            }
        }
    }
}

/// Type alias for Results using SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
