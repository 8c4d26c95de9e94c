//! Device registry consumed by the session controller
//!
//! The controller only needs `find_by_id` to check ownership and platform.
//! Registration and listing back the device endpoints of the HTTP API.

use crate::storage::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Mobile operating system of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// A registered device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub model: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Device {
    pub fn new(user_id: impl Into<String>, platform: Platform, model: Option<String>) -> Self {
        Self {
            id: format!("device-{}", Uuid::new_v4()),
            user_id: user_id.into(),
            platform,
            model,
            registered_at: Utc::now(),
        }
    }
}

/// Lookup and registration of devices
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn find_by_id(&self, device_id: &str) -> StoreResult<Option<Device>>;

    async fn register(&self, device: Device) -> StoreResult<Device>;

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Device>>;
}

/// Process-local device directory
#[derive(Default)]
pub struct InMemoryDeviceDirectory {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceDirectory for InMemoryDeviceDirectory {
    async fn find_by_id(&self, device_id: &str) -> StoreResult<Option<Device>> {
        Ok(self.devices.read().await.get(device_id).cloned())
    }

    async fn register(&self, device: Device) -> StoreResult<Device> {
        self.devices
            .write()
            .await
            .insert(device.id.clone(), device.clone());
        Ok(device)
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Device>> {
        let devices = self.devices.read().await;
        let mut owned: Vec<Device> = devices
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_find() {
        let directory = InMemoryDeviceDirectory::new();
        let device = directory
            .register(Device::new("user-1", Platform::Android, Some("SM-G991B".into())))
            .await
            .unwrap();

        let found = directory.find_by_id(&device.id).await.unwrap().unwrap();
        assert_eq!(found, device);
        assert!(directory.find_by_id("device-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_only_returns_owned_devices() {
        let directory = InMemoryDeviceDirectory::new();
        directory
            .register(Device::new("user-1", Platform::Android, None))
            .await
            .unwrap();
        directory
            .register(Device::new("user-1", Platform::Ios, None))
            .await
            .unwrap();
        directory
            .register(Device::new("user-2", Platform::Ios, None))
            .await
            .unwrap();

        assert_eq!(directory.list_for_user("user-1").await.unwrap().len(), 2);
        assert_eq!(directory.list_for_user("user-2").await.unwrap().len(), 1);
        assert!(directory.list_for_user("user-3").await.unwrap().is_empty());
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("Android".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!("ios".parse::<Platform>(), Ok(Platform::Ios));
        assert!("symbian".parse::<Platform>().is_err());
    }
}
