//! Session lifecycle management with pure state transition logic

use super::state::SessionStatus;

/// A status change requested of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Cancel,
    Complete,
    Fail,
}

impl Transition {
    /// Statuses from which this transition is legal
    pub fn allowed_from(self) -> &'static [SessionStatus] {
        use SessionStatus::*;
        match self {
            Transition::Start => &[Pending],
            Transition::Pause => &[Running],
            Transition::Resume => &[Paused],
            Transition::Cancel | Transition::Complete | Transition::Fail => &[Running, Paused],
        }
    }

    /// Status a session ends in after this transition
    pub fn target(self) -> SessionStatus {
        match self {
            Transition::Start | Transition::Resume => SessionStatus::Running,
            Transition::Pause => SessionStatus::Paused,
            Transition::Cancel => SessionStatus::Cancelled,
            Transition::Complete => SessionStatus::Completed,
            Transition::Fail => SessionStatus::Failed,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Cancel => "cancel",
            Transition::Complete => "complete",
            Transition::Fail => "fail",
        }
    }
}

/// Validate a transition from the current status
pub fn validate_transition(
    current: SessionStatus,
    transition: Transition,
) -> Result<SessionStatus, String> {
    if transition.allowed_from().contains(&current) {
        Ok(transition.target())
    } else {
        Err(format!(
            "cannot {} a session that is {}",
            transition.verb(),
            current
        ))
    }
}
