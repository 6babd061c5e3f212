//! Configuration – reads/writes `~/.parkwatch/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parkwatch_types::ParkError;
use serde::{Deserialize, Serialize};

/// Persisted configuration shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address the server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL the dashboard and the sensor tools talk to.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout for client requests (dashboard, sensor).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Timeout the server applies to each incoming request.
    #[serde(default = "default_server_timeout_ms")]
    pub server_timeout_ms: u64,

    /// Number of spaces in the lot; scales the terminal bar chart and the simulator.
    #[serde(default = "default_lot_capacity")]
    pub lot_capacity: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_request_timeout_ms() -> u64 {
    3000
}
fn default_server_timeout_ms() -> u64 {
    5000
}
fn default_lot_capacity() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            server_timeout_ms: default_server_timeout_ms(),
            lot_capacity: default_lot_capacity(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn server_timeout(&self) -> Duration {
        Duration::from_millis(self.server_timeout_ms)
    }
}

/// Return the path to `~/.parkwatch/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".parkwatch").join("config.toml")
}

/// Load the config at `path`, falling back to defaults when the file does not
/// exist, then apply environment overrides.
pub fn load_or_default(path: &Path) -> Result<Config, ParkError> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ParkError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        ParkError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| ParkError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PORT` | `port` |
/// | `PARKWATCH_HOST` | `host` |
/// | `PARKWATCH_SERVER_URL` | `server_url` |
/// | `PARKWATCH_POLL_INTERVAL_MS` | `poll_interval_ms` |
/// | `PARKWATCH_REQUEST_TIMEOUT_MS` | `request_timeout_ms` |
///
/// Values that fail to parse are ignored, as are zero intervals and timeouts.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_from(cfg, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
        cfg.port = port;
    }
    if let Some(host) = lookup("PARKWATCH_HOST") {
        cfg.host = host;
    }
    if let Some(url) = lookup("PARKWATCH_SERVER_URL") {
        cfg.server_url = url;
    }
    if let Some(ms) = lookup("PARKWATCH_POLL_INTERVAL_MS").and_then(parse_millis) {
        cfg.poll_interval_ms = ms;
    }
    if let Some(ms) = lookup("PARKWATCH_REQUEST_TIMEOUT_MS").and_then(parse_millis) {
        cfg.request_timeout_ms = ms;
    }
}

fn parse_millis(raw: String) -> Option<u64> {
    raw.trim().parse().ok().filter(|ms| *ms > 0)
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ParkError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ParkError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| ParkError::Config(format!("failed to serialize config: {e}")))?;

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| {
                ParkError::Config(format!("failed to write config at {}: {e}", path.display()))
            })?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| {
        ParkError::Config(format!("failed to write config at {}: {e}", path.display()))
    })?;
    Ok(())
}
