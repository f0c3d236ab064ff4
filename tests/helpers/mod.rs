#![allow(dead_code)]
//! Shared fixtures for the integration tests: mock provider endpoints and
//! configuration builders.

pub mod mock_telegram;

use notify_hub::config::{Config, PlatformConfig};
use notify_hub::Notify;
use std::io::Write;
use tempfile::NamedTempFile;

/// A checksummed token address used by the trade menu tests.
pub const TOKEN_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Builds a `Notify` for one platform with a short request timeout.
pub fn notify_for(platform: PlatformConfig) -> Notify {
    let mut config = Config::for_platform(platform);
    config.request_timeout_seconds = 5;
    Notify::new(config)
}

/// Writes `content` to a temporary TOML file that lives as long as the handle.
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}
