//! Completion resolver: the single terminal write of a session

use super::Engine;
use crate::catalog::MethodSpec;
use crate::session::{Session, SessionEvent, SessionId, SessionResult, SessionStatus};
use crate::storage::{SessionPatch, StoreError, StoreResult};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome handed to the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub success: bool,
    pub error_message: Option<String>,
    pub details: Map<String, Value>,
}

impl Resolution {
    pub fn succeeded(details: Map<String, Value>) -> Self {
        Self {
            success: true,
            error_message: None,
            details,
        }
    }

    pub fn failed(error_message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            details,
        }
    }

    fn into_result(self) -> SessionResult {
        SessionResult {
            success: self.success,
            error_message: self.error_message,
            details: self.details,
        }
    }
}

/// Details recorded in every result
pub fn format_details(
    session: &Session,
    spec: &MethodSpec,
    steps_completed: u32,
    elapsed: Duration,
) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("serviceType".into(), json!(session.service_type));
    details.insert("method".into(), json!(session.method));
    details.insert("stepsCompleted".into(), json!(steps_completed));
    details.insert("totalSteps".into(), json!(spec.total_steps));
    details.insert("elapsedMs".into(), json!(elapsed.as_millis() as u64));
    details.insert("options".into(), session.options.clone());
    details
}

/// Details for a session that ran every step
pub fn success_details(
    session: &Session,
    spec: &MethodSpec,
    elapsed: Duration,
) -> Map<String, Value> {
    let mut details = format_details(session, spec, spec.total_steps, elapsed);
    details.insert("outcome".into(), json!(spec.outcome));
    details
}

/// Details for a session whose step failed
pub fn failure_details(
    session: &Session,
    spec: &MethodSpec,
    failed_step: u32,
    elapsed: Duration,
) -> Map<String, Value> {
    let mut details = format_details(session, spec, failed_step.saturating_sub(1), elapsed);
    details.insert("failedStep".into(), json!(failed_step));
    details.insert("failedPhase".into(), json!(spec.phase_for_step(failed_step)));
    details
}

impl Engine {
    /// Finalize a session as completed or failed
    ///
    /// Returns `Ok(None)` without writing when the session already left the
    /// running/paused states, so repeated or racing calls are harmless.
    pub async fn resolve(
        &self,
        id: &SessionId,
        resolution: Resolution,
    ) -> StoreResult<Option<Session>> {
        let status = if resolution.success {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        };
        let result = resolution.into_result();

        let patch = SessionPatch::expecting(&SessionStatus::ACTIVE)
            .status(status)
            .completed_at(Utc::now())
            .result(result.clone());

        // The driver is done either way
        self.registry().remove(id);
        let outcome = self.store().update_fields(id, patch).await;

        match outcome {
            Ok(session) => {
                info!(session = %id, "Session {}", status);
                let event = if result.success {
                    SessionEvent::Completed { result }
                } else {
                    SessionEvent::Failed { result }
                };
                self.notify(id, event).await;
                Ok(Some(session))
            }
            Err(StoreError::StatusMismatch { actual, .. }) => {
                debug!(session = %id, "Session already {}, ignoring {}", actual, status);
                Ok(None)
            }
            Err(e) => {
                warn!(session = %id, "Failed to record session outcome: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{lookup, ServiceType};
    use crate::engine::{EngineSettings, FixedOutcome};
    use crate::session::Progress;
    use crate::storage::{MemoryBackend, SessionStore};
    use std::sync::Arc;

    async fn engine_with_running_session() -> (Arc<Engine>, Session) {
        let store = Arc::new(MemoryBackend::new());
        let mut session = Session::new(
            "user-1",
            "device-1",
            ServiceType::FrpBypass,
            "adb_frp_bypass",
            Progress::initial(4, "connecting_device"),
            json!({"note": "test"}),
        );
        session.status = SessionStatus::Running;
        store.create(&session).await.unwrap();

        let engine = Arc::new(Engine::new(
            store,
            Arc::new(FixedOutcome::never_fail()),
            EngineSettings::default(),
        ));
        (engine, session)
    }

    #[tokio::test]
    async fn test_resolve_success_writes_result() {
        let (engine, session) = engine_with_running_session().await;
        let spec = lookup(ServiceType::FrpBypass, "adb_frp_bypass").unwrap();

        let resolved = engine
            .resolve(
                &session.id,
                Resolution::succeeded(success_details(&session, spec, Duration::from_millis(42))),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.status, SessionStatus::Completed);
        assert!(resolved.completed_at.is_some());
        let result = resolved.result.unwrap();
        assert!(result.success);
        assert_eq!(result.details["outcome"], "frp_lock_removed");
        assert_eq!(result.details["stepsCompleted"], 4);
        assert_eq!(result.details["options"]["note"], "test");
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let (engine, session) = engine_with_running_session().await;

        let first = engine
            .resolve(&session.id, Resolution::failed("step failed", Map::new()))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = engine
            .resolve(&session.id, Resolution::succeeded(Map::new()))
            .await
            .unwrap();
        assert!(second.is_none());

        let stored = engine.store().find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Failed);
        assert_eq!(
            stored.result.unwrap().error_message.as_deref(),
            Some("step failed")
        );
    }

    #[tokio::test]
    async fn test_resolve_after_cancel_is_noop() {
        let (engine, session) = engine_with_running_session().await;
        engine
            .store()
            .update_fields(
                &session.id,
                SessionPatch::expecting(&SessionStatus::ACTIVE).status(SessionStatus::Cancelled),
            )
            .await
            .unwrap();

        let resolved = engine
            .resolve(&session.id, Resolution::succeeded(Map::new()))
            .await
            .unwrap();
        assert!(resolved.is_none());

        let stored = engine.store().find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Cancelled);
        assert!(stored.result.is_none());
    }

    #[test]
    fn test_failure_details_name_the_phase() {
        let spec = lookup(ServiceType::FrpBypass, "adb_frp_bypass").unwrap();
        let session = Session::new(
            "user-1",
            "device-1",
            ServiceType::FrpBypass,
            "adb_frp_bypass",
            Progress::initial(4, "connecting_device"),
            Value::Null,
        );

        let details = failure_details(&session, spec, 3, Duration::from_millis(10));
        assert_eq!(details["failedStep"], 3);
        assert_eq!(details["failedPhase"], "removing_frp_lock");
        assert_eq!(details["stepsCompleted"], 2);
        assert!(!details.contains_key("outcome"));
    }
}
