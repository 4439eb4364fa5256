//! CLI-owned configuration: TOML file + `ALLERTRACK_*` environment, and
//! translation to `allertrack_core::TrackerConfig`.
//!
//! Core never sees these types -- it receives a pre-built `TrackerConfig`
//! and never reads disk.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use allertrack_core::TrackerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config struct ───────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Tracker server root URL.
    #[serde(default = "default_server")]
    pub server: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Open the live channel for `watch` (on-demand commands never do).
    #[serde(default = "default_true")]
    pub live_updates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout: default_timeout(),
            live_updates: true,
        }
    }
}

fn default_server() -> String {
    "http://localhost:8000".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "allertrack", "allertrack")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("allertrack");
            p.push("config.toml");
            p
        })
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the config from defaults, file, and environment (in that order
/// of precedence, lowest first).
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("ALLERTRACK_"));

    Ok(figment.extract()?)
}

// ── TrackerConfig resolution ─────────────────────────────────────────

/// Build a `TrackerConfig` from the loaded config and CLI flag
/// overrides. This is the single boundary where CLI config types cross
/// into core types.
pub fn build_tracker_config(
    config: &Config,
    global: &GlobalOpts,
    live_updates: bool,
) -> Result<TrackerConfig, CliError> {
    let url_str = global.server.as_deref().unwrap_or(&config.server);
    let server_url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let timeout = Duration::from_secs(global.timeout.unwrap_or(config.timeout));

    Ok(TrackerConfig {
        server_url,
        timeout,
        live_updates: live_updates && config.live_updates,
        ..TrackerConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["allertrack"];
        argv.extend_from_slice(args);
        argv.push("show");
        Cli::parse_from(argv).global
    }

    #[test]
    fn flags_override_the_config_file() {
        let config = Config::default();
        let resolved = build_tracker_config(
            &config,
            &global(&["--server", "http://tracker.local:9000", "--timeout", "5"]),
            false,
        )
        .expect("config");

        assert_eq!(resolved.server_url.as_str(), "http://tracker.local:9000/");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
        assert!(!resolved.live_updates);
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = Config::default();
        let resolved = build_tracker_config(&config, &global(&[]), true).expect("config");

        assert_eq!(resolved.server_url.as_str(), "http://localhost:8000/");
        assert_eq!(resolved.timeout, Duration::from_secs(30));
        assert!(resolved.live_updates);
    }

    #[test]
    fn invalid_server_url_is_a_validation_error() {
        let config = Config::default();
        let err = build_tracker_config(&config, &global(&["--server", "not a url"]), false)
            .expect_err("should reject");
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
