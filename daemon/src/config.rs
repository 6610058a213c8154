//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use anyhow::Context;
use procura_lifecycle::TransitionPolicy;
use procura_utils::LogFormat;
use serde::{Deserialize, Serialize};

/// Environment variable accepted as a fallback for the listen address.
pub const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";

/// Configuration for a procura daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`] or built
/// programmatically; CLI flags are applied on top with [`Overrides::apply`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// LMDB map size in megabytes.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Filter directive, e.g. "info" or "info,procura_lifecycle=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Which tender status changes owners may request.
    #[serde(default)]
    pub tender_transitions: TransitionPolicy,

    /// Serve Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./procura_data")
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_address: default_listen_address(),
            map_size_mb: default_map_size_mb(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            tender_transitions: TransitionPolicy::default(),
            enable_metrics: false,
        }
    }
}

/// Values given on the command line or through `PROCURA_*` variables.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct Overrides {
    /// Directory holding the LMDB environment.
    #[arg(long, env = "PROCURA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Address to listen on, e.g. "0.0.0.0:8080". Falls back to SERVER_ADDRESS.
    #[arg(long, env = "PROCURA_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// LMDB map size in megabytes.
    #[arg(long, env = "PROCURA_MAP_SIZE_MB")]
    pub map_size_mb: Option<usize>,

    /// Per-request deadline in seconds.
    #[arg(long, env = "PROCURA_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PROCURA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PROCURA_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Tender transitions: "permissive" or "forward_only".
    #[arg(long, env = "PROCURA_TENDER_TRANSITIONS")]
    pub tender_transitions: Option<TransitionPolicy>,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long, env = "PROCURA_ENABLE_METRICS")]
    pub metrics: bool,
}

impl Overrides {
    /// Layer these values over `base`. `server_address` is the legacy
    /// environment fallback, used only when no listen address was given here.
    pub fn apply(self, base: DaemonConfig, server_address: Option<String>) -> DaemonConfig {
        DaemonConfig {
            data_dir: self.data_dir.unwrap_or(base.data_dir),
            listen_address: self
                .listen_address
                .or(server_address)
                .unwrap_or(base.listen_address),
            map_size_mb: self.map_size_mb.unwrap_or(base.map_size_mb),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(base.request_timeout_secs),
            log_level: self.log_level.unwrap_or(base.log_level),
            log_format: self.log_format.unwrap_or(base.log_format),
            tender_transitions: self.tender_transitions.unwrap_or(base.tender_transitions),
            enable_metrics: self.metrics || base.enable_metrics,
        }
    }
}

/// File config (if any) with CLI and environment overrides applied.
pub fn resolve(overrides: Overrides, file: Option<&Path>) -> anyhow::Result<DaemonConfig> {
    let base = match file {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    let server_address = std::env::var(SERVER_ADDRESS_ENV).ok().filter(|s| !s.is_empty());
    Ok(overrides.apply(base, server_address))
}
