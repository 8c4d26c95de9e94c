use crate::engine::EngineSettings;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub mod loader;
pub mod validator;

pub use loader::{load_config, load_config_with, CONFIG_FILE_NAME};
pub use validator::validate_config;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "PHONEKIT_";

/// Get the default data directory for durable session storage
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "phonekit", "phonekit")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".phonekit"))
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: String,
    pub log_level: Option<String>,
    pub storage: StorageSettings,
    pub engine: EngineSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            log_level: None,
            storage: StorageSettings::default(),
            engine: EngineSettings::default(),
        }
    }
}

/// Which session store to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Memory,
    File,
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendType::Memory => f.write_str("memory"),
            BackendType::File => f.write_str("file"),
        }
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            "file" => Ok(BackendType::File),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: BackendType,
    /// Directory for the file backend; defaults to the platform data dir
    pub dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn effective_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_data_dir)
    }
}

impl ServiceConfig {
    /// Apply `PHONEKIT_*` overrides read through `lookup`
    ///
    /// Returns one message per variable that could not be parsed; the
    /// remaining overrides are still applied.
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut problems = Vec::new();

        if let Some(bind) = var("BIND") {
            self.bind = bind;
        }

        if let Some(log_level) = var("LOG_LEVEL") {
            self.log_level = Some(log_level);
        }

        if let Some(backend) = var("STORAGE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => problems.push(format!("{ENV_PREFIX}STORAGE_BACKEND: {e}")),
            }
        }

        if let Some(dir) = var("STORAGE_DIR") {
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(scale) = var("DELAY_SCALE") {
            match scale.parse::<f64>() {
                Ok(value) => self.engine.delay_scale = value,
                Err(_) => problems.push(format!(
                    "{ENV_PREFIX}DELAY_SCALE: '{scale}' is not a number"
                )),
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.storage.backend, BackendType::Memory);
        assert_eq!(config.engine.delay_scale, 1.0);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_merge_env_overrides() {
        let mut config = ServiceConfig::default();
        let problems = config.merge_env_with(env(&[
            ("PHONEKIT_BIND", "0.0.0.0:9000"),
            ("PHONEKIT_STORAGE_BACKEND", "FILE"),
            ("PHONEKIT_STORAGE_DIR", "/var/lib/phonekit"),
            ("PHONEKIT_DELAY_SCALE", "0.25"),
            ("PHONEKIT_LOG_LEVEL", "debug"),
        ]));

        assert!(problems.is_empty());
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.storage.backend, BackendType::File);
        assert_eq!(config.storage.effective_dir(), PathBuf::from("/var/lib/phonekit"));
        assert_eq!(config.engine.delay_scale, 0.25);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_merge_env_collects_every_problem() {
        let mut config = ServiceConfig::default();
        let problems = config.merge_env_with(env(&[
            ("PHONEKIT_STORAGE_BACKEND", "redis"),
            ("PHONEKIT_DELAY_SCALE", "fast"),
            ("PHONEKIT_BIND", "127.0.0.1:7000"),
        ]));

        assert_eq!(problems.len(), 2);
        assert_eq!(config.bind, "127.0.0.1:7000");
        assert_eq!(config.storage.backend, BackendType::Memory);
    }

    #[test]
    fn test_parse_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
bind = "127.0.0.1:3000"

[storage]
backend = "file"
dir = "/tmp/sessions"

[engine]
delay_scale = 0.5
"#,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.storage.backend, BackendType::File);
        assert_eq!(config.engine.delay_scale, 0.5);
    }
}
