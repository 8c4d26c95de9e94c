//! Session controller: validates caller requests and applies them
//!
//! The controller writes only status and timestamps. Progress belongs to the
//! driver and the terminal result to the resolver, both inside
//! [`crate::engine`].
//!
//! Pause, resume and cancel on one session run one at a time: the status
//! write and the driver signal that follows it happen under a per-session
//! lock, so the registry always ends up agreeing with the stored status.

use super::{
    validate_transition, Progress, ProgressView, Session, SessionEvent, SessionFilter, SessionId,
    SessionObserver, SessionStatus, Transition,
};
use crate::catalog::{lookup, MethodSpec, ServiceType};
use crate::device::{Device, DeviceDirectory, Platform};
use crate::engine::{DriverSignal, Engine};
use crate::error::{ErrorCode, Result, SessionError};
use crate::storage::{SessionPatch, StoreError};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Parameters of a `start` call
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub user_id: String,
    pub device_id: String,
    pub service_type: ServiceType,
    pub method: String,
    pub options: Value,
}

/// Entry point for every session operation
pub struct SessionController {
    engine: Arc<Engine>,
    devices: Arc<dyn DeviceDirectory>,
    control_locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionController {
    pub fn new(engine: Arc<Engine>, devices: Arc<dyn DeviceDirectory>) -> Self {
        Self {
            engine,
            devices,
            control_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub async fn add_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.engine.add_observer(observer).await;
    }

    /// Persist a running session and start its driver
    ///
    /// Returns as soon as the record is stored; the driver runs on its own task.
    pub async fn start(&self, request: StartRequest) -> Result<Session> {
        let StartRequest {
            user_id,
            device_id,
            service_type,
            method,
            options,
        } = request;

        let device = self
            .devices
            .find_by_id(&device_id)
            .await?
            .filter(|d| d.user_id == user_id)
            .ok_or_else(|| SessionError::device_not_found(&device_id))?;

        let spec = lookup(service_type, &method).ok_or_else(|| {
            SessionError::invalid_argument(
                ErrorCode::METHOD_UNKNOWN,
                format!("method '{method}' is not available for {service_type}"),
            )
        })?;

        if !spec.supports(device.platform) {
            return Err(SessionError::invalid_argument(
                ErrorCode::DEVICE_PLATFORM_UNSUPPORTED,
                format!("{method} does not support {} devices", device.platform),
            ));
        }

        let options = match options {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            _ => {
                return Err(SessionError::invalid_argument(
                    ErrorCode::SESSION_INVALID_REQUEST,
                    "options must be a JSON object",
                ))
            }
        };

        let mut session = Session::new(
            user_id,
            device.id,
            service_type,
            spec.name,
            Progress::initial(spec.total_steps, spec.phase_for_step(1)),
            options,
        );
        session.status = validate_transition(session.status, Transition::Start)
            .map_err(SessionError::invalid_state)?;
        session.started_at = Utc::now();
        session.updated_at = session.started_at;

        self.engine.store().create(&session).await?;
        info!(
            session = %session.id,
            "Started {} {} ({} steps)",
            service_type,
            spec.name,
            spec.total_steps
        );

        self.engine
            .notify(
                &session.id,
                SessionEvent::Started {
                    method: spec.name.to_string(),
                    total_steps: spec.total_steps,
                },
            )
            .await;
        self.engine.spawn_driver(&session, spec);

        Ok(session)
    }

    pub async fn get_progress(
        &self,
        session_id: &SessionId,
        user_id: &str,
    ) -> Result<ProgressView> {
        let session = self.load_owned(session_id, user_id).await?;
        Ok(ProgressView::from(&session))
    }

    pub async fn get_session(&self, session_id: &SessionId, user_id: &str) -> Result<Session> {
        self.load_owned(session_id, user_id).await
    }

    /// Stop advancing without giving up the session
    pub async fn pause(&self, session_id: &SessionId, user_id: &str) -> Result<Session> {
        let _control = self.lock_control(session_id).await;
        let updated = self
            .transition(session_id, user_id, Transition::Pause, |patch| {
                patch.paused_at(Utc::now())
            })
            .await?;

        self.engine
            .registry()
            .signal(session_id, DriverSignal::Pause);
        self.engine.notify(session_id, SessionEvent::Paused).await;
        Ok(updated)
    }

    /// Continue from the stored `current_step`
    pub async fn resume(&self, session_id: &SessionId, user_id: &str) -> Result<Session> {
        let _control = self.lock_control(session_id).await;
        let updated = self
            .transition(session_id, user_id, Transition::Resume, |patch| {
                patch.resumed_at(Utc::now())
            })
            .await?;

        if !self.engine.registry().signal(session_id, DriverSignal::Run) {
            debug!(session = %session_id, "No live driver, spawning one");
            let spec = method_spec(&updated)?;
            self.engine.spawn_driver(&updated, spec);
        }

        let from_step = updated.progress.current_step.max(1);
        self.engine
            .notify(session_id, SessionEvent::Resumed { from_step })
            .await;
        Ok(updated)
    }

    /// End the session without a result
    pub async fn cancel(&self, session_id: &SessionId, user_id: &str) -> Result<Session> {
        let _control = self.lock_control(session_id).await;
        let updated = self
            .transition(session_id, user_id, Transition::Cancel, |patch| {
                patch.completed_at(Utc::now())
            })
            .await?;

        self.engine.registry().remove(session_id);
        self.engine.notify(session_id, SessionEvent::Cancelled).await;
        Ok(updated)
    }

    /// The caller's sessions, newest first
    pub async fn list_sessions(
        &self,
        user_id: &str,
        filter: SessionFilter,
    ) -> Result<Vec<Session>> {
        let filter = SessionFilter {
            user_id: Some(user_id.to_string()),
            ..filter
        };
        Ok(self.engine.store().list(&filter).await?)
    }

    pub async fn register_device(
        &self,
        user_id: &str,
        platform: Platform,
        model: Option<String>,
    ) -> Result<Device> {
        let device = self
            .devices
            .register(Device::new(user_id, platform, model))
            .await?;
        info!("Registered {} device {} for {}", device.platform, device.id, user_id);
        Ok(device)
    }

    pub async fn list_devices(&self, user_id: &str) -> Result<Vec<Device>> {
        Ok(self.devices.list_for_user(user_id).await?)
    }

    /// Respawn drivers for sessions stored as running but with no live driver
    ///
    /// Paused sessions are left alone; `resume` gives them a driver.
    pub async fn recover_orphans(&self) -> Result<usize> {
        let running = self
            .engine
            .store()
            .list(&SessionFilter::default().with_status(SessionStatus::Running))
            .await?;

        let mut recovered = 0;
        for session in running {
            match lookup(session.service_type, &session.method) {
                Some(spec) => {
                    if self.engine.spawn_driver(&session, spec) {
                        recovered += 1;
                    }
                }
                None => warn!(
                    session = %session.id,
                    "Cannot recover session with unknown method {}", session.method
                ),
            }
        }

        if recovered > 0 {
            info!("Recovered {} orphaned session(s)", recovered);
        }
        Ok(recovered)
    }

    /// Stop every driver, leaving stored status untouched
    pub fn shutdown(&self) -> usize {
        let stopped = self.engine.registry().stop_all();
        info!("Stopped {} driver(s)", stopped);
        stopped
    }

    /// Wait for exclusive control of a session
    async fn lock_control(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .control_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(session_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    async fn load_owned(&self, session_id: &SessionId, user_id: &str) -> Result<Session> {
        let session = self
            .engine
            .store()
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| SessionError::session_not_found(session_id))?;

        if session.user_id != user_id {
            return Err(SessionError::forbidden(session_id));
        }
        Ok(session)
    }

    /// Check ownership and legality, then apply the status change atomically
    async fn transition(
        &self,
        session_id: &SessionId,
        user_id: &str,
        transition: Transition,
        stamp: impl FnOnce(SessionPatch) -> SessionPatch,
    ) -> Result<Session> {
        let session = self.load_owned(session_id, user_id).await?;
        let target =
            validate_transition(session.status, transition).map_err(SessionError::invalid_state)?;

        let patch = stamp(SessionPatch::expecting(transition.allowed_from()).status(target));
        let updated = self
            .engine
            .store()
            .update_fields(session_id, patch)
            .await
            .map_err(|e| match e {
                // Lost a race with the driver or another request
                StoreError::StatusMismatch { actual, .. } => SessionError::invalid_state(
                    validate_transition(actual, transition)
                        .err()
                        .unwrap_or_else(|| format!("session is {actual}")),
                ),
                other => other.into(),
            })?;

        info!(session = %session_id, "Session {} -> {}", session.status, updated.status);
        Ok(updated)
    }
}

fn method_spec(session: &Session) -> Result<&'static MethodSpec> {
    lookup(session.service_type, &session.method).ok_or_else(|| {
        SessionError::invalid_argument(
            ErrorCode::METHOD_UNKNOWN,
            format!(
                "method '{}' is not available for {}",
                session.method, session.service_type
            ),
        )
    })
}
