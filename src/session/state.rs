//! Session record definitions

use super::SessionId;
use crate::catalog::ServiceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Session status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    /// Statuses that count toward the one-active-session rule
    pub const ACTIVE: [SessionStatus; 2] = [SessionStatus::Running, SessionStatus::Paused];

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }

    /// Check if session is running or paused
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "running" => Ok(SessionStatus::Running),
            "paused" => Ok(SessionStatus::Paused),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// Step bookkeeping for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub percentage: u8,
    pub current_step: u32,
    pub total_steps: u32,
    pub current_phase: String,
    pub estimated_time_remaining_ms: Option<u64>,
    /// Time spent running so far, excluding paused intervals
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl Progress {
    /// Progress of a session that has not run any step yet
    pub fn initial(total_steps: u32, first_phase: impl Into<String>) -> Self {
        Self {
            percentage: 0,
            current_step: 0,
            total_steps,
            current_phase: first_phase.into(),
            estimated_time_remaining_ms: None,
            elapsed_ms: 0,
        }
    }

    /// Progress after entering `step`, given the running time spent so far
    pub fn at_step(
        step: u32,
        total_steps: u32,
        phase: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        let step = step.min(total_steps);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let estimated_time_remaining_ms = if step == 0 {
            None
        } else {
            let per_step = elapsed_ms / u64::from(step);
            Some(per_step.saturating_mul(u64::from(total_steps - step)))
        };

        Self {
            percentage: completion_percentage(step, total_steps),
            current_step: step,
            total_steps,
            current_phase: phase.into(),
            estimated_time_remaining_ms,
            elapsed_ms,
        }
    }
}

/// `round(step / total * 100)`, clamped to 0..=100
pub fn completion_percentage(step: u32, total_steps: u32) -> u8 {
    if total_steps == 0 {
        return 0;
    }
    let pct = (f64::from(step) / f64::from(total_steps) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Terminal outcome of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// One invocation of an advanced device operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub device_id: String,
    pub service_type: ServiceType,
    pub method: String,
    pub status: SessionStatus,
    pub progress: Progress,
    #[serde(default)]
    pub options: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub result: Option<SessionResult>,
}

impl Session {
    /// Build a pending session record
    pub fn new(
        user_id: impl Into<String>,
        device_id: impl Into<String>,
        service_type: ServiceType,
        method: impl Into<String>,
        progress: Progress,
        options: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id: user_id.into(),
            device_id: device_id.into(),
            service_type,
            method: method.into(),
            status: SessionStatus::Pending,
            progress,
            options,
            started_at: now,
            paused_at: None,
            resumed_at: None,
            completed_at: None,
            updated_at: now,
            result: None,
        }
    }

    /// Whether this session occupies the (user, device, service) slot of `other`
    pub fn same_slot(&self, other: &Session) -> bool {
        self.user_id == other.user_id
            && self.device_id == other.device_id
            && self.service_type == other.service_type
    }

    /// Wall-clock time spent so far (or in total, once finished)
    pub fn duration(&self) -> Duration {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        (end - self.started_at)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }
}

/// Read model returned by `get_progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub session_id: SessionId,
    pub service_type: ServiceType,
    pub method: String,
    pub status: SessionStatus,
    pub progress: Progress,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<SessionResult>,
}

impl From<&Session> for ProgressView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            service_type: session.service_type,
            method: session.method.clone(),
            status: session.status,
            progress: session.progress.clone(),
            started_at: session.started_at,
            paused_at: session.paused_at,
            resumed_at: session.resumed_at,
            completed_at: session.completed_at,
            result: session.result.clone(),
        }
    }
}

/// Session filter criteria
#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub user_id: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<SessionStatus>,
    pub limit: Option<usize>,
}

impl SessionFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check a session against every set criterion
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(user_id) = &self.user_id {
            if &session.user_id != user_id {
                return false;
            }
        }
        if let Some(service_type) = &self.service_type {
            if session.service_type != *service_type {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if session.status != *status {
                return false;
            }
        }
        true
    }

    /// Sort newest first and truncate to `limit`
    pub fn finish(&self, mut sessions: Vec<Session>) -> Vec<Session> {
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        if let Some(limit) = self.limit {
            sessions.truncate(limit);
        }
        sessions
    }
}
