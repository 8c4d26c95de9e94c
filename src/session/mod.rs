//! Session state management
//!
//! Session records, their lifecycle rules, the events they emit, and the
//! controller that validates and applies caller requests.

pub mod controller;
pub mod events;
pub mod lifecycle;
pub mod state;

pub use controller::{SessionController, StartRequest};
pub use events::{LoggingObserver, SessionEvent, SessionObserver, TimestampedEvent};
pub use lifecycle::{validate_transition, Transition};
pub use state::{
    completion_percentage, Progress, ProgressView, Session, SessionFilter, SessionResult,
    SessionStatus,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID
    pub fn new() -> Self {
        Self(format!("session-{}", Uuid::new_v4()))
    }

    /// Create from an existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
