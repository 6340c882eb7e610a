use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8880;
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1_000; // mode reconciliation cadence
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_SNAPSHOT_INTERVAL_MS: u64 = 200; // ~5 frames per second while controlled

/// Top-level config (tether.toml + TETHER_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TetherConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// The peer this client keeps a persistent connection to.
///
/// Only used for log context by the scheduler; the transport owns the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` label attached to emission logs.
    pub fn peer(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Intervals driving the heartbeat / snapshot scheduler, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How often the supervisor decides which task should be running.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Liveness ping period while the session is idle.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Capture period while the session is under control.
    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            snapshot_interval_ms: DEFAULT_SNAPSHOT_INTERVAL_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn check_interval(&self) -> Result<Duration> {
        positive("check_interval_ms", self.check_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Result<Duration> {
        positive("heartbeat_interval_ms", self.heartbeat_interval_ms)
    }

    pub fn snapshot_interval(&self) -> Result<Duration> {
        positive("snapshot_interval_ms", self.snapshot_interval_ms)
    }

    /// Reject any zero interval up front instead of at the first schedule start.
    pub fn validate(&self) -> Result<()> {
        self.check_interval()?;
        self.heartbeat_interval()?;
        self.snapshot_interval()?;
        Ok(())
    }
}

fn positive(name: &'static str, ms: u64) -> Result<Duration> {
    if ms == 0 {
        return Err(TetherError::InvalidInterval { name });
    }
    Ok(Duration::from_millis(ms))
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_check_interval_ms() -> u64 {
    DEFAULT_CHECK_INTERVAL_MS
}
fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_MS
}
fn default_snapshot_interval_ms() -> u64 {
    DEFAULT_SNAPSHOT_INTERVAL_MS
}

impl TetherConfig {
    /// Load config from a TOML file with TETHER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `TETHER_CONFIG` env var
    ///   3. ~/.tether/tether.toml
    ///
    /// Nested env keys use a double underscore:
    /// `TETHER_SCHEDULER__SNAPSHOT_INTERVAL_MS=100`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("TETHER_CONFIG").ok())
            .unwrap_or_else(default_config_path);

        let config: TetherConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("TETHER_").split("__"))
            .extract()?;

        tracing::debug!(path = %path, "tether config loaded");
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.tether/tether.toml", home)
}
