//! Progress engine
//!
//! The engine owns everything that runs after a session is persisted: the
//! registry of driver tasks, the per-session driver loop, the randomness
//! behind step failures, and the resolver that writes the terminal outcome.
//! It is parametrized entirely by [`crate::catalog::MethodSpec`].

pub mod driver;
pub mod outcome;
pub mod registry;
pub mod resolver;

pub use outcome::{FixedOutcome, OutcomeSource, RandomOutcomes, ScriptedOutcomes};
pub use registry::{DriverLease, DriverRegistry, DriverSignal};
pub use resolver::{failure_details, format_details, success_details, Resolution};

use crate::catalog::MethodSpec;
use crate::session::{Session, SessionEvent, SessionId, SessionObserver, TimestampedEvent};
use crate::storage::SessionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info_span, Instrument};

/// Tunables for the driver loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Multiplier applied to every phase delay; 0 runs steps back to back
    pub delay_scale: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { delay_scale: 1.0 }
    }
}

/// Shared engine state, held behind an `Arc` by the controller and every driver
pub struct Engine {
    store: Arc<dyn SessionStore>,
    registry: DriverRegistry,
    outcomes: Arc<dyn OutcomeSource>,
    observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        outcomes: Arc<dyn OutcomeSource>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            registry: DriverRegistry::new(),
            outcomes,
            observers: RwLock::new(Vec::new()),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    pub fn outcomes(&self) -> &dyn OutcomeSource {
        self.outcomes.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Add an observer for session events
    pub async fn add_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Notify all observers of an event
    pub async fn notify(&self, session_id: &SessionId, event: SessionEvent) {
        let event = TimestampedEvent::new(session_id.clone(), event);
        let observers = self.observers.read().await;
        for observer in observers.iter() {
            observer.on_event(&event).await;
        }
    }

    /// Phase delay after applying `delay_scale`, saturating at `Duration::MAX`
    pub fn scaled_delay(&self, delay: Duration) -> Duration {
        let scale = self.settings.delay_scale;
        if scale <= 0.0 || scale.is_nan() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(delay.as_secs_f64() * scale).unwrap_or(Duration::MAX)
    }

    /// Spawn a driver for `session` unless one is already registered
    ///
    /// The driver picks up at the stored `current_step` (or step 1 for a
    /// fresh session). Returns false when a driver already owns the session.
    pub fn spawn_driver(self: &Arc<Self>, session: &Session, spec: &'static MethodSpec) -> bool {
        let Some(lease) = self.registry.register(&session.id) else {
            debug!(session = %session.id, "Driver already registered");
            return false;
        };

        let start_step = session.progress.current_step.max(1);
        let span = info_span!("session", id = %session.id);
        tokio::spawn(
            driver::drive(Arc::clone(self), session.clone(), spec, start_step, lease)
                .instrument(span),
        );
        true
    }
}
