//! Application module
//!
//! Process-level wiring shared by the binary and the integration tests:
//! - Logging setup
//! - Verbosity handling
//! - Building the controller from a [`crate::config::ServiceConfig`]
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{build_controller, build_controller_with};
