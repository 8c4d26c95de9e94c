use super::ServiceConfig;
use std::net::SocketAddr;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Largest accepted `engine.delay_scale`
pub const MAX_DELAY_SCALE: f64 = 1000.0;

/// Check every field, collecting all problems instead of stopping at the first
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if config.bind.parse::<SocketAddr>().is_err() {
        problems.push(format!(
            "bind: '{}' is not a socket address (expected host:port)",
            config.bind
        ));
    }

    if let Some(log_level) = &config.log_level {
        if !VALID_LOG_LEVELS.contains(&log_level.to_ascii_lowercase().as_str()) {
            problems.push(format!(
                "log_level: invalid level '{}'. Must be one of: {:?}",
                log_level, VALID_LOG_LEVELS
            ));
        }
    }

    let scale = config.engine.delay_scale;
    if !scale.is_finite() || !(0.0..=MAX_DELAY_SCALE).contains(&scale) {
        problems.push(format!(
            "engine.delay_scale: must be between 0 and {MAX_DELAY_SCALE}, got {scale}"
        ));
    }

    if let Some(dir) = &config.storage.dir {
        if dir.as_os_str().is_empty() {
            problems.push("storage.dir: cannot be empty".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
