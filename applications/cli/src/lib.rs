//! Cadence CLI - headless host for the Cadence player
//!
//! Drives a `Player` over the filesystem stores with a `HeadlessMedia`
//! element, so a saved playlist can be inspected and edited without a
//! browser.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::Session;
pub use config::AppConfig;
pub use error::{CliError, Result};
