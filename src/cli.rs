//! Command-Line Interface (CLI) argument parsing.
//!
//! Arguments are parsed with `clap` and then merged on top of the
//! `notify.toml` file and environment variables, so a flag always wins.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send one notification through the configured backend.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Timeout for provider requests in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Credential token for the configured platform. Requires a configured
    /// `kind`; platforms without a `token` setting ignore it.
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// JSON file with extension metadata (trade intents) for this message.
    #[arg(short, long, value_name = "FILE")]
    pub extension: Option<PathBuf>,

    /// The message to send. Read from stdin when omitted.
    pub message: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(timeout) = self.timeout {
            dict.insert("request_timeout_seconds".into(), Value::from(timeout));
        }

        // Nested so it merges into whichever `[platform]` table is configured.
        if let Some(token) = &self.token {
            let mut platform = Dict::new();
            platform.insert("token".into(), Value::from(token.clone()));
            dict.insert("platform".into(), Value::Dict(Tag::Default, platform));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
