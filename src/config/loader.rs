use super::{validate_config, ServiceConfig};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "phonekit.toml";

/// Load configuration: defaults, then a TOML file, then `PHONEKIT_*` variables
///
/// An explicit `path` must exist. Without one, `phonekit.toml` in the working
/// directory is used if present.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Same as [`load_config`] with an injectable environment
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => {
            let default = PathBuf::from(CONFIG_FILE_NAME);
            default.exists().then_some(default)
        }
    };

    let mut config = match &file {
        Some(file) => {
            debug!("Loading configuration from {}", file.display());
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            toml::from_str::<ServiceConfig>(&content)
                .with_context(|| format!("Failed to parse {}", file.display()))?
        }
        None => ServiceConfig::default(),
    };

    let mut problems = config.merge_env_with(lookup);
    if let Err(invalid) = validate_config(&config) {
        problems.extend(invalid);
    }

    if !problems.is_empty() {
        bail!("Invalid configuration:\n  - {}", problems.join("\n  - "));
    }

    Ok(config)
}
