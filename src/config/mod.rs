//! Configuration module
//!
//! Search, remote backend and display settings, persisted as TOML.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::{Config, DisplayConfig, RemoteConfig, SearchConfig};
