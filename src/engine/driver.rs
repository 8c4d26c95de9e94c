//! Per-session progress driver loop

use super::{failure_details, success_details, DriverLease, DriverSignal, Engine, Resolution};
use crate::catalog::MethodSpec;
use crate::session::{Progress, Session, SessionEvent, SessionId, SessionStatus};
use crate::storage::{SessionPatch, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Advance `session` one step per tick until it resolves or is stopped
///
/// Only the driver writes `progress`, and every write is guarded on the
/// session still being `running`. A pause interrupts the sleep; the
/// interrupted step is persisted again once the session resumes.
///
/// Running time carries over from the stored `elapsed_ms` and only grows
/// while a step is in flight, so paused time never feeds the ETA.
pub(crate) async fn drive(
    engine: Arc<Engine>,
    session: Session,
    spec: &'static MethodSpec,
    start_step: u32,
    lease: DriverLease,
) {
    let DriverLease {
        signal: mut rx,
        generation,
    } = lease;
    let id = session.id.clone();
    let total = spec.total_steps;
    let mut step = start_step.clamp(1, total.max(1));
    let mut running_for = Duration::from_millis(session.progress.elapsed_ms);

    debug!("Driver started at step {}/{}", step, total);

    loop {
        if !wait_until_runnable(&mut rx).await {
            debug!("Driver stopped at step {}/{}", step, total);
            break;
        }

        let phase = spec.phase_for_step(step);
        let progress = Progress::at_step(step, total, phase, running_for);
        let patch = SessionPatch::expecting(&[SessionStatus::Running]).progress(progress.clone());

        match engine.store().update_fields(&id, patch).await {
            Ok(_) => {}
            Err(StoreError::StatusMismatch {
                actual: SessionStatus::Paused,
                ..
            }) => {
                // Paused in the store before the signal arrived
                if rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
            Err(StoreError::StatusMismatch { actual, .. }) => {
                debug!("Session is {}, driver exiting", actual);
                break;
            }
            Err(e) => {
                warn!("Failed to persist progress at step {}/{}: {}", step, total, e);
                let details = failure_details(&session, spec, step, session.duration());
                let message = format!("progress could not be saved during {phase}: {e}");
                finish(&engine, &id, Resolution::failed(message, details)).await;
                break;
            }
        }

        debug!(
            "Step {}/{} ({}%) {}",
            step, total, progress.percentage, progress.current_phase
        );
        engine
            .notify(&id, SessionEvent::StepAdvanced { progress })
            .await;

        let delay = engine.scaled_delay(spec.delay_for_step(step));
        let tick = Instant::now();
        tokio::select! {
            _ = tokio::time::sleep(delay) => running_for += tick.elapsed(),
            changed = rx.changed() => {
                running_for += tick.elapsed();
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        if engine.outcomes().step_fails(spec.failure_probability) {
            warn!("Step {}/{} failed during {}", step, total, phase);
            let details = failure_details(&session, spec, step, session.duration());
            let message = format!(
                "{} failed during {} (step {}/{})",
                spec.name, phase, step, total
            );
            finish(&engine, &id, Resolution::failed(message, details)).await;
            break;
        }

        if step >= total {
            let details = success_details(&session, spec, session.duration());
            finish(&engine, &id, Resolution::succeeded(details)).await;
            break;
        }

        step += 1;
    }

    engine.registry().release(&id, generation);
}

/// Block while paused; false once the driver should exit
async fn wait_until_runnable(rx: &mut watch::Receiver<DriverSignal>) -> bool {
    loop {
        let signal = *rx.borrow_and_update();
        match signal {
            DriverSignal::Run => return true,
            DriverSignal::Stop => return false,
            DriverSignal::Pause => {
                if rx.changed().await.is_err() {
                    return false;
                }
            }
        }
    }
}

async fn finish(engine: &Engine, id: &SessionId, resolution: Resolution) {
    if let Err(e) = engine.resolve(id, resolution).await {
        warn!("Session {} could not be finalized: {}", id, e);
    }
}
