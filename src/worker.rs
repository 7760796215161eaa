// Background host sampler loop: refreshes registry counters from the host and
// periodically logs what the node currently holds.

use crate::host::HostSampler;
use crate::pipeline;
use crate::runtime::Registry;
use std::sync::Arc;
use tokio::time::{Duration, interval};

/// Sampler, registry and shutdown signal for the worker.
pub struct WorkerDeps {
    pub sampler: Arc<HostSampler>,
    pub registry: Arc<Registry>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing. Stats logging uses its own real-time interval.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    pub stats_log_interval_secs: u64,
}

/// Spawns the sampling loop. Exits after the shutdown signal (or sender drop).
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        sampler,
        registry,
        mut shutdown_rx,
    } = deps;
    tokio::spawn(async move {
        let mut sample_tick = interval(Duration::from_millis(config.sample_interval_ms));
        sample_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
        stats_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = sample_tick.tick() => {
                    match sampler.sample().await {
                        Ok(summary) => {
                            if summary.spawned > 0 || summary.exited > 0 {
                                tracing::debug!(
                                    mirrored = summary.mirrored,
                                    spawned = summary.spawned,
                                    exited = summary.exited,
                                    "host processes synced"
                                );
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "host sample failed"),
                    }
                }
                _ = stats_tick.tick() => {
                    let usage = pipeline::fetch_system_usage(&*registry);
                    tracing::info!(
                        processes = usage.processes,
                        ports = usage.ports,
                        tables = usage.tables,
                        memory_total = usage.memory.total,
                        memory_other = usage.memory.other,
                        "node stats"
                    );
                }
                _ = &mut shutdown_rx => break,
            }
        }
        tracing::debug!("Sampler worker shutting down");
    })
}
