//! End-to-end session lifecycle through the public library API

use phonekit::app::build_controller_with;
use phonekit::catalog::ServiceType;
use phonekit::config::{BackendType, ServiceConfig};
use phonekit::device::Platform;
use phonekit::engine::{FixedOutcome, ScriptedOutcomes};
use phonekit::session::{Session, SessionController, SessionId, SessionStatus, StartRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const USER: &str = "user-1";

fn file_config(dir: &TempDir, delay_scale: f64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.storage.backend = BackendType::File;
    config.storage.dir = Some(dir.path().to_path_buf());
    config.engine.delay_scale = delay_scale;
    config
}

async fn start(
    controller: &SessionController,
    platform: Platform,
    service_type: ServiceType,
    method: &str,
) -> Session {
    let device = controller
        .register_device(USER, platform, None)
        .await
        .unwrap();
    controller
        .start(StartRequest {
            user_id: USER.to_string(),
            device_id: device.id,
            service_type,
            method: method.to_string(),
            options: json!({}),
        })
        .await
        .unwrap()
}

async fn wait_until<F>(controller: &SessionController, id: &SessionId, mut done: F) -> Session
where
    F: FnMut(&Session) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let session = controller.get_session(id, USER).await.unwrap();
            if done(&session) {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test]
async fn test_file_store_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let id = {
        let controller = build_controller_with(
            &file_config(&temp_dir, 100.0),
            Arc::new(FixedOutcome::never_fail()),
        )
        .await
        .unwrap();
        let session = start(
            &controller,
            Platform::Android,
            ServiceType::FrpBypass,
            "talkback_frp_bypass",
        )
        .await;
        wait_until(&controller, &session.id, |s| s.progress.current_step == 1).await;
        controller.shutdown();
        session.id
    };

    // Building a controller over the same directory recovers the session
    let controller = build_controller_with(
        &file_config(&temp_dir, 0.0),
        Arc::new(FixedOutcome::never_fail()),
    )
    .await
    .unwrap();
    let done = wait_until(&controller, &id, |s| s.status.is_terminal()).await;

    assert_eq!(done.status, SessionStatus::Completed);
    assert_eq!(done.progress.current_step, 5);
    assert_eq!(done.progress.percentage, 100);
    assert!(done.result.unwrap().success);
}

#[tokio::test]
async fn test_paused_session_stays_paused_across_restart() {
    let temp_dir = TempDir::new().unwrap();

    let id = {
        let controller = build_controller_with(
            &file_config(&temp_dir, 100.0),
            Arc::new(FixedOutcome::never_fail()),
        )
        .await
        .unwrap();
        let session = start(
            &controller,
            Platform::Ios,
            ServiceType::DataEraser,
            "quick_erase",
        )
        .await;
        controller.pause(&session.id, USER).await.unwrap();
        controller.shutdown();
        session.id
    };

    let controller = build_controller_with(
        &file_config(&temp_dir, 0.0),
        Arc::new(FixedOutcome::never_fail()),
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let paused = controller.get_session(&id, USER).await.unwrap();
    assert_eq!(paused.status, SessionStatus::Paused);

    controller.resume(&id, USER).await.unwrap();
    let done = wait_until(&controller, &id, |s| s.status.is_terminal()).await;
    assert_eq!(done.status, SessionStatus::Completed);
    assert!(done.resumed_at.is_some());
}

#[tokio::test]
async fn test_terminal_session_is_frozen() {
    let temp_dir = TempDir::new().unwrap();
    let controller = build_controller_with(
        &file_config(&temp_dir, 0.0),
        Arc::new(ScriptedOutcomes::fail_after(1)),
    )
    .await
    .unwrap();

    let session = start(
        &controller,
        Platform::Android,
        ServiceType::SystemRepair,
        "standard_repair",
    )
    .await;
    let failed = wait_until(&controller, &session.id, |s| s.status.is_terminal()).await;
    assert_eq!(failed.status, SessionStatus::Failed);
    assert_eq!(failed.progress.current_step, 2);

    for attempt in [
        controller.pause(&session.id, USER).await,
        controller.resume(&session.id, USER).await,
        controller.cancel(&session.id, USER).await,
    ] {
        assert!(attempt.is_err());
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    let later = controller.get_session(&session.id, USER).await.unwrap();
    assert_eq!(later, failed);
}
