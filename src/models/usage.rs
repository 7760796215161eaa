// System usage and system info records

use serde::{Deserialize, Serialize};

/// Memory breakdown in bytes. `other` is whatever `total` does not attribute to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub process: u64,
    pub atom: u64,
    pub binary: u64,
    pub code: u64,
    pub ets: u64,
    /// Signed: the categories are read one by one, so under concurrent allocation
    /// they can briefly add up to more than `total`.
    pub other: i64,
}

impl MemoryUsage {
    pub fn from_counters(total: u64, process: u64, atom: u64, binary: u64, code: u64, ets: u64) -> Self {
        let accounted = process
            .saturating_add(atom)
            .saturating_add(binary)
            .saturating_add(code)
            .saturating_add(ets);
        let other = (total as i128 - accounted as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Self {
            total,
            process,
            atom,
            binary,
            code,
            ets,
            other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IoUsage {
    pub input: u64,
    pub output: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageRecord {
    pub atoms: u64,
    pub ports: u64,
    pub processes: u64,
    pub tables: u64,
    pub io: IoUsage,
    pub uptime_ms: u64,
    pub total_run_queue: u64,
    pub cpu_run_queue: u64,
    pub memory: MemoryUsage,
}

/// Configured ceilings for the node's entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemLimits {
    pub atoms: u64,
    pub ports: u64,
    pub processes: u64,
    pub ets: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfoRecord {
    pub node: String,
    pub runtime_version: String,
    pub system_banner: String,
    pub os_name: String,
    pub cpu_model: String,
    pub schedulers: u32,
    pub limits: SystemLimits,
    pub usage: UsageRecord,
}
