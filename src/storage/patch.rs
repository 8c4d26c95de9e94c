//! Partial session updates and the pure function that applies them

use super::error::{StoreError, StoreResult};
use crate::session::{Progress, Session, SessionResult, SessionStatus};
use chrono::{DateTime, Utc};

/// Field-level update of a stored session
///
/// `expected` turns the update into a compare-and-set: the store rejects the
/// patch with [`StoreError::StatusMismatch`] unless the current status is one
/// of the listed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub expected: Option<Vec<SessionStatus>>,
    pub status: Option<SessionStatus>,
    pub progress: Option<Progress>,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<SessionResult>,
}

impl SessionPatch {
    /// Start a patch guarded on the current status
    pub fn expecting(statuses: &[SessionStatus]) -> Self {
        Self {
            expected: Some(statuses.to_vec()),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn paused_at(mut self, at: DateTime<Utc>) -> Self {
        self.paused_at = Some(at);
        self
    }

    pub fn resumed_at(mut self, at: DateTime<Utc>) -> Self {
        self.resumed_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn result(mut self, result: SessionResult) -> Self {
        self.result = Some(result);
        self
    }
}

/// Apply a patch to a session in place (pure function)
pub fn apply_patch(session: &mut Session, patch: SessionPatch) -> StoreResult<()> {
    if let Some(expected) = patch.expected {
        if !expected.contains(&session.status) {
            return Err(StoreError::StatusMismatch {
                expected,
                actual: session.status,
            });
        }
    }

    let next_status = patch.status.unwrap_or(session.status);
    if patch.result.is_some()
        && !matches!(next_status, SessionStatus::Completed | SessionStatus::Failed)
    {
        return Err(StoreError::Other(anyhow::anyhow!(
            "result may only be recorded on a completed or failed session"
        )));
    }

    if let Some(progress) = patch.progress {
        apply_progress_update(session, progress);
    }
    if let Some(status) = patch.status {
        session.status = status;
    }
    if let Some(at) = patch.paused_at {
        session.paused_at = Some(at);
    }
    if let Some(at) = patch.resumed_at {
        session.resumed_at = Some(at);
    }
    if let Some(at) = patch.completed_at {
        // completedAt is written once
        session.completed_at.get_or_insert(at);
    }
    if let Some(result) = patch.result {
        session.result = Some(result);
    }

    session.updated_at = Utc::now();
    Ok(())
}

/// Merge new progress, keeping step and percentage monotonic
fn apply_progress_update(session: &mut Session, mut progress: Progress) {
    let current = &session.progress;
    if progress.current_step < current.current_step {
        return;
    }

    progress.total_steps = current.total_steps;
    progress.current_step = progress.current_step.min(current.total_steps);
    progress.percentage = progress.percentage.min(100).max(current.percentage);
    progress.elapsed_ms = progress.elapsed_ms.max(current.elapsed_ms);
    session.progress = progress;
}
