//! Session lifecycle events and observers
//!
//! Observers receive every transition and every driver tick. A real-time
//! fan-out (websocket, push) plugs in here without touching the engine.

use super::{Progress, SessionId, SessionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Events that can occur during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    Started { method: String, total_steps: u32 },
    StepAdvanced { progress: Progress },
    Paused,
    Resumed { from_step: u32 },
    Cancelled,
    Completed { result: SessionResult },
    Failed { result: SessionResult },
}

impl SessionEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SessionEvent::Started {
                method,
                total_steps,
            } => format!("Session started with {method} ({total_steps} steps)"),
            SessionEvent::StepAdvanced { progress } => format!(
                "Step {}/{} ({}%): {}",
                progress.current_step,
                progress.total_steps,
                progress.percentage,
                progress.current_phase
            ),
            SessionEvent::Paused => "Session paused".to_string(),
            SessionEvent::Resumed { from_step } => format!("Session resumed at step {from_step}"),
            SessionEvent::Cancelled => "Session cancelled".to_string(),
            SessionEvent::Completed { .. } => "Session completed".to_string(),
            SessionEvent::Failed { result } => format!(
                "Session failed: {}",
                result.error_message.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    /// Check if this event represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::Cancelled | SessionEvent::Completed { .. } | SessionEvent::Failed { .. }
        )
    }
}

/// Event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub event: SessionEvent,
}

impl TimestampedEvent {
    pub fn new(session_id: SessionId, event: SessionEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id,
            event,
        }
    }
}

/// Observer for session events
#[async_trait]
pub trait SessionObserver: Send + Sync {
    /// Called when an event occurs
    async fn on_event(&self, event: &TimestampedEvent);
}

/// Logs every event through `tracing`
pub struct LoggingObserver;

#[async_trait]
impl SessionObserver for LoggingObserver {
    async fn on_event(&self, event: &TimestampedEvent) {
        match &event.event {
            SessionEvent::StepAdvanced { .. } => {
                debug!(session = %event.session_id, "{}", event.event.description())
            }
            other => info!(session = %event.session_id, "{}", other.description()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_descriptions() {
        let event = SessionEvent::StepAdvanced {
            progress: Progress::at_step(
                1,
                4,
                "connecting_device",
                std::time::Duration::from_millis(10),
            ),
        };
        assert_eq!(event.description(), "Step 1/4 (25%): connecting_device");
        assert!(!event.is_terminal());

        let event = SessionEvent::Failed {
            result: SessionResult {
                success: false,
                error_message: Some("device disconnected".to_string()),
                details: Default::default(),
            },
        };
        assert_eq!(event.description(), "Session failed: device disconnected");
        assert!(event.is_terminal());
        assert!(SessionEvent::Cancelled.is_terminal());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = SessionEvent::Resumed { from_step: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "resumed");
        assert_eq!(json["fromStep"], 3);
    }
}
