use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::SystemLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub node: NodeConfig,
    pub transport: TransportConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Name this agent answers to; handles it issues carry it.
    pub name: String,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_atom_limit")]
    pub atoms: u64,
    #[serde(default = "default_port_limit")]
    pub ports: u64,
    #[serde(default = "default_process_limit")]
    pub processes: u64,
    #[serde(default = "default_ets_limit")]
    pub ets: u64,
}

fn default_atom_limit() -> u64 {
    1_048_576
}

fn default_port_limit() -> u64 {
    65_536
}

fn default_process_limit() -> u64 {
    262_144
}

fn default_ets_limit() -> u64 {
    8_192
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            atoms: default_atom_limit(),
            ports: default_port_limit(),
            processes: default_process_limit(),
            ets: default_ets_limit(),
        }
    }
}

impl From<LimitsConfig> for SystemLimits {
    fn from(l: LimitsConfig) -> Self {
        SystemLimits {
            atoms: l.atoms,
            ports: l.ports,
            processes: l.processes,
            ets: l.ets,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Per-call deadline for outgoing RPC; no retries after it expires.
    pub timeout_ms: u64,
    /// Peer node name -> `host:port` of its agent.
    #[serde(default)]
    pub peers: BTreeMap<String, String>,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Push interval of /ws/usage.
    pub usage_frequency_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// How often to log registry stats at INFO level.
    pub stats_log_interval_secs: u64,
    /// Expose OS processes of this host as inspectable processes.
    #[serde(default = "default_mirror_host_processes")]
    pub mirror_host_processes: bool,
}

fn default_mirror_host_processes() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.node.name.is_empty(), "node.name must be non-empty");
        anyhow::ensure!(
            self.transport.timeout_ms > 0,
            "transport.timeout_ms must be > 0, got {}",
            self.transport.timeout_ms
        );
        for (node, addr) in &self.transport.peers {
            anyhow::ensure!(
                addr.rsplit_once(':')
                    .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok()),
                "transport.peers.{} must be host:port, got {:?}",
                node,
                addr
            );
        }
        anyhow::ensure!(
            self.publishing.usage_frequency_ms > 0,
            "publishing.usage_frequency_ms must be > 0, got {}",
            self.publishing.usage_frequency_ms
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
