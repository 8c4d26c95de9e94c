//! Common test utilities and helpers

#![allow(dead_code)]

use phonekit::api::{build_router, USER_ID_HEADER};
use phonekit::app::build_controller_with;
use phonekit::config::ServiceConfig;
use phonekit::engine::OutcomeSource;
use phonekit::session::SessionController;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// A server bound to an ephemeral port plus the controller behind it
pub struct TestServer {
    pub base_url: String,
    pub controller: Arc<SessionController>,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start(config: ServiceConfig, outcomes: Arc<dyn OutcomeSource>) -> Self {
        let controller = build_controller_with(&config, outcomes).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = build_router(Arc::clone(&controller));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/v1"),
            controller,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, user: Option<&str>, path: &str) -> (u16, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user);
        }
        read(request.send().await.unwrap()).await
    }

    pub async fn post(&self, user: Option<&str>, path: &str, body: Value) -> (u16, Value) {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user);
        }
        read(request.send().await.unwrap()).await
    }

    /// Register a device and return its id
    pub async fn device(&self, user: &str, platform: &str) -> String {
        let (status, body) = self
            .post(
                Some(user),
                "/devices",
                serde_json::json!({ "platform": platform, "model": "test" }),
            )
            .await;
        assert_eq!(status, 201, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Poll progress until `done` holds
    pub async fn wait_for<F>(&self, user: &str, session_id: &str, mut done: F) -> Value
    where
        F: FnMut(&Value) -> bool,
    {
        let path = format!("/sessions/{session_id}/progress");
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let (status, body) = self.get(Some(user), &path).await;
                assert_eq!(status, 200, "{body}");
                if done(&body["data"]) {
                    return body["data"].clone();
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("progress condition not reached in time")
    }
}

async fn read(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

pub fn fast_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.engine.delay_scale = 0.0;
    config
}

pub fn slow_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.engine.delay_scale = 100.0;
    config
}

pub fn is_terminal(view: &Value) -> bool {
    matches!(
        view["status"].as_str(),
        Some("completed") | Some("failed") | Some("cancelled")
    )
}
