use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{defaults, envvars};
use crate::device::PointDef;
use crate::sensors::RecordType;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("point {0} is defined more than once")]
    DuplicatePoint(u32),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_privilege_level")]
    pub privilege_level: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// In-memory shelf described by a JSON file
    Simulated { shelf: PathBuf },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PointConfig {
    #[serde(flatten)]
    pub def: PointDef,
    pub record: RecordType,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub device_id: i16,
    pub connection: ConnectionConfig,
    pub transport: TransportConfig,
    #[serde(default)]
    pub points: Vec<PointConfig>,
    #[serde(default = "default_read_interval_secs")]
    pub read_interval_secs: u64,
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_connect_retry_secs")]
    pub connect_retry_secs: u64,
}

fn default_protocol() -> String {
    defaults::PROTOCOL.to_string()
}

fn default_privilege_level() -> i32 {
    defaults::PRIVILEGE_LEVEL
}

fn default_read_interval_secs() -> u64 {
    defaults::READ_INTERVAL.as_secs()
}

fn default_scan_interval_secs() -> u64 {
    defaults::SCAN_INTERVAL.as_secs()
}

fn default_queue_capacity() -> usize {
    defaults::QUEUE_CAPACITY
}

fn default_connect_retry_secs() -> u64 {
    defaults::CONNECT_RETRY_WINDOW.as_secs()
}

impl GatewayConfig {
    pub fn read_interval(&self) -> Duration {
        Duration::from_secs(self.read_interval_secs.max(1))
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn connect_retry_window(&self) -> Duration {
        Duration::from_secs(self.connect_retry_secs)
    }
}

/// Parse a configuration; a password in the environment overrides the file.
/// Relative shelf paths are left as given.
pub fn from_str(config_raw: &str) -> Result<GatewayConfig, ConfigError> {
    let mut config: GatewayConfig = serde_json::from_str(config_raw)?;
    if let Ok(password) = env::var(envvars::PASSWORD) {
        config.connection.password = password;
    }
    let mut seen = std::collections::BTreeSet::new();
    for point in &config.points {
        if !seen.insert(point.def.id) {
            return Err(ConfigError::DuplicatePoint(point.def.id));
        }
    }
    Ok(config)
}

/// Load from a file; relative shelf paths resolve against the file's directory
pub fn from_file(path: impl AsRef<Path>) -> Result<GatewayConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = from_str(&raw)?;
    let TransportConfig::Simulated { shelf } = &mut config.transport;
    if shelf.is_relative() {
        if let Some(dir) = path.parent() {
            *shelf = dir.join(&*shelf);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::ProcessingMode;

    const CONFIG: &str = r#"
    {
        "connection": { "host": "shelf-1", "username": "admin", "password": "secret" },
        "transport": { "kind": "simulated", "shelf": "shelf.json" },
        "points": [
            { "id": 1, "record": "ai", "link": "@0x20 3" },
            { "id": 2, "record": "mbbi", "link": "0x82 *", "mode": "asynchronous" }
        ]
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = temp_env::with_var_unset(envvars::PASSWORD, || from_str(CONFIG)).unwrap();
        assert_eq!(config.connection.protocol, "lanplus");
        assert_eq!(config.connection.privilege_level, 2);
        assert_eq!(config.connection.password, "secret");
        assert_eq!(config.read_interval(), defaults::READ_INTERVAL);
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.points.len(), 2);
        assert_eq!(config.points[1].record, RecordType::Mbbi);
        assert_eq!(config.points[1].def.mode, ProcessingMode::Asynchronous);
        assert_eq!(config.points[0].def.mode, ProcessingMode::Synchronous);
    }

    #[test]
    fn test_duplicate_point_rejected() {
        let raw = CONFIG.replace("\"id\": 2", "\"id\": 1");
        assert!(matches!(
            from_str(&raw),
            Err(ConfigError::DuplicatePoint(1))
        ));
    }

    #[test]
    fn test_unknown_record_rejected() {
        let raw = CONFIG.replace("\"mbbi\"", "\"bo\"");
        assert!(matches!(from_str(&raw), Err(ConfigError::ParseJson(_))));
    }
}
