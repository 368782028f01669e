// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

fn default_listen_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3003
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_product_type() -> String {
    "DishWashers".to_string()
}

fn default_utc_offset() -> String {
    "+13:00".to_string()
}

fn default_download_period() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default = "default_listen_address")]
    pub listen_address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single provider call. `0` disables it.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default)]
    pub appliance: ApplianceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: None,
            listen_address: default_listen_address(),
            port: default_port(),
            provider_timeout_secs: default_provider_timeout_secs(),
            appliance: ApplianceConfig::default(),
        }
    }
}

impl Config {
    pub fn provider_timeout(&self) -> Option<Duration> {
        (self.provider_timeout_secs > 0).then(|| Duration::from_secs(self.provider_timeout_secs))
    }
}

/// Connection settings for the `machine_details` reader.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplianceConfig {
    /// The reader is only registered when this is set.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_product_type")]
    pub product_type: String,
    /// Offset the appliance reports its local timestamps in, `+HH:MM`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_download_period")]
    pub download_period: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        ApplianceConfig {
            base_url: None,
            product_type: default_product_type(),
            utc_offset: default_utc_offset(),
            download_period: default_download_period(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Where the loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    /// A path was given but does not exist.
    Missing(PathBuf),
    File(PathBuf),
}

impl ConfigSource {
    /// Called once the logger is up; loading happens before that.
    pub fn log(&self) {
        match self {
            ConfigSource::Defaults => info!("No config file given, using defaults"),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        }
    }
}

/// Loads the YAML config. No path, or a path that does not exist, yields
/// the defaults; a file that exists but fails to parse is an error.
pub fn load_config(path: Option<&Path>) -> Result<(Config, ConfigSource)> {
    let Some(path) = path else {
        return Ok((Config::default(), ConfigSource::Defaults));
    };
    if !path.exists() {
        return Ok((Config::default(), ConfigSource::Missing(path.to_path_buf())));
    }

    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let source = ConfigSource::File(path.to_path_buf());
    // An empty document deserializes as unit, not as an empty map.
    if contents.trim().is_empty() {
        return Ok((Config::default(), source));
    }
    let config: Config =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok((config, source))
}

/// Parse an agent-style log level string into a log::Level
/// Unknown levels silently default to Info
fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" => log::Level::Error,
        "off" => log::Level::Error, // log has no "off" level
        _ => log::Level::Info,
    }
}

/// Gets the log level from configuration.
/// Priority: DD_LOG_LEVEL > LOG_LEVEL > YAML config > default Info
pub fn get_log_level(config: &Config) -> log::Level {
    if let Ok(level) = env::var("DD_LOG_LEVEL") {
        return parse_log_level(&level);
    }

    if let Ok(level) = env::var("LOG_LEVEL") {
        return parse_log_level(&level);
    }

    config
        .log_level
        .as_deref()
        .map(parse_log_level)
        .unwrap_or(log::Level::Info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults_without_path() {
        let (config, source) = load_config(None).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.port, 3003);
        assert_eq!(config.listen_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.provider_timeout(), Some(Duration::from_secs(30)));
        assert!(config.appliance.base_url.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.port, 3003);
        assert_eq!(source, ConfigSource::Missing(path));
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = create_test_config("");
        let (config, source) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.provider_timeout_secs, 30);
        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
log_level: debug
listen_address: 127.0.0.1
port: 8080
provider_timeout_secs: 0
appliance:
  base_url: http://appliance.local
  product_type: Dryers
  utc_offset: "+12:00"
  download_period: 1
  request_timeout_secs: 5
"#;
        let file = create_test_config(yaml);
        let (config, _) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.listen_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8080);
        assert_eq!(config.provider_timeout(), None);
        assert_eq!(config.appliance.base_url.as_deref(), Some("http://appliance.local"));
        assert_eq!(config.appliance.product_type, "Dryers");
        assert_eq!(config.appliance.utc_offset, "+12:00");
        assert_eq!(config.appliance.download_period, 1);
        assert_eq!(config.appliance.request_timeout_secs, 5);
    }

    #[test]
    fn test_partial_appliance_section_keeps_defaults() {
        let yaml = "appliance:\n  base_url: http://appliance.local\n";
        let file = create_test_config(yaml);
        let (config, _) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.appliance.product_type, "DishWashers");
        assert_eq!(config.appliance.utc_offset, "+13:00");
        assert_eq!(config.appliance.download_period, 5);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let file = create_test_config("port: [not, a, port]");
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("WARNING"), log::Level::Warn);
        assert_eq!(parse_log_level("critical"), log::Level::Error);
        assert_eq!(parse_log_level("off"), log::Level::Error);
        assert_eq!(parse_log_level("bogus"), log::Level::Info);
    }

    #[test]
    fn test_env_overrides_yaml_log_level() {
        let config = Config {
            log_level: Some("error".to_string()),
            ..Config::default()
        };
        temp_env::with_vars(
            [("DD_LOG_LEVEL", Some("debug")), ("LOG_LEVEL", Some("warn"))],
            || assert_eq!(get_log_level(&config), log::Level::Debug),
        );
        temp_env::with_vars(
            [("DD_LOG_LEVEL", None), ("LOG_LEVEL", Some("warn"))],
            || assert_eq!(get_log_level(&config), log::Level::Warn),
        );
        temp_env::with_vars(
            [("DD_LOG_LEVEL", None::<&str>), ("LOG_LEVEL", None)],
            || assert_eq!(get_log_level(&config), log::Level::Error),
        );
    }

    #[test]
    fn test_default_log_level_is_info() {
        temp_env::with_vars(
            [("DD_LOG_LEVEL", None::<&str>), ("LOG_LEVEL", None)],
            || assert_eq!(get_log_level(&Config::default()), log::Level::Info),
        );
    }
}
