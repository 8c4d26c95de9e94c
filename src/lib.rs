//! # phonekit
//!
//! Session progress engine for simulated advanced phone operations: screen
//! unlock, system repair, data eraser, FRP bypass and iCloud bypass.
//!
//! ## Usage
//!
//! ```bash
//! phonekit serve [--config phonekit.toml] [--bind 127.0.0.1:8080]
//! phonekit simulate --service frp_bypass --method adb_frp_bypass
//! ```
//!
//! ## Modules
//!
//! - `api` - axum routes over the session controller
//! - `app` - Logging, runtime wiring and fatal error reporting
//! - `catalog` - Method and phase tables for every service
//! - `config` - Service configuration from TOML and environment
//! - `device` - Device records and the directory the controller consults
//! - `engine` - Driver registry, per-session driver loop and completion resolver
//! - `error` - Controller error kinds and the error code registry
//! - `session` - Session records, lifecycle rules, events and the controller
//! - `storage` - Session store trait with memory and file backends
pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod session;
pub mod storage;
