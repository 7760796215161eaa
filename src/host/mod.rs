// Host sampler: feeds OS counters (via sysinfo) into the node registry and
// optionally mirrors OS processes as inspectable processes.

mod linux;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use sysinfo::{Networks, Pid, ProcessStatus, ProcessesToUpdate, System};
use tracing::instrument;

use crate::models::{ResourceHandle, SystemLimits};
use crate::runtime::{Descriptors, MemoryCategory, Mfa, NodeRuntime, ProcessSpec, Registry};
use crate::version::{NAME, VERSION};

/// What one sampling pass changed in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSummary {
    pub mirrored: usize,
    pub spawned: usize,
    pub exited: usize,
}

pub struct HostSampler {
    registry: Arc<Registry>,
    sys: Arc<Mutex<System>>,
    networks: Arc<Mutex<Networks>>,
    mirrored: Arc<Mutex<HashMap<Pid, ResourceHandle>>>,
    mirror_processes: bool,
}

impl HostSampler {
    pub fn new(registry: Arc<Registry>, mirror_processes: bool) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        Self {
            registry,
            sys: Arc::new(Mutex::new(sys)),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            mirrored: Arc::new(Mutex::new(HashMap::new())),
            mirror_processes,
        }
    }

    /// Static identity of this host, combined with the configured limits.
    #[instrument(skip(self), fields(repo = "host", operation = "describe"))]
    pub async fn describe(&self, limits: SystemLimits) -> anyhow::Result<Descriptors> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let os_name = linux::read_os_pretty_name_linux()
                .or_else(System::long_os_version)
                .unwrap_or_else(|| std::env::consts::OS.into());
            let cpu_model = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.brand().to_string())
                        .filter(|s| !s.is_empty())
                })
                .unwrap_or_else(|| "Unknown".into());
            let schedulers = sys.cpus().len().max(1) as u32;
            Ok(Descriptors {
                runtime_version: VERSION.to_string(),
                system_banner: format!(
                    "{} {} [{}-{}] [schedulers:{}]",
                    NAME,
                    VERSION,
                    std::env::consts::ARCH,
                    std::env::consts::OS,
                    schedulers
                ),
                os_name,
                cpu_model,
                schedulers,
                limits,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    /// Refresh host counters into the registry and, when enabled, sync mirrored processes.
    #[instrument(skip(self), fields(repo = "host", operation = "sample"))]
    pub async fn sample(&self) -> anyhow::Result<SampleSummary> {
        let sys = self.sys.clone();
        let networks = self.networks.clone();
        let mirrored = self.mirrored.clone();
        let registry = self.registry.clone();
        let mirror_processes = self.mirror_processes;
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);

            registry.set_uptime_ms(System::uptime().saturating_mul(1000));

            let runnable = sys
                .processes()
                .values()
                .filter(|p| p.status() == ProcessStatus::Run)
                .count() as u64;
            registry.set_run_queues(runnable, runnable);

            {
                let mut networks = networks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
                networks.refresh(true);
                let (input, output) = networks.list().values().fold((0u64, 0u64), |(rx, tx), d| {
                    (
                        rx.saturating_add(d.total_received()),
                        tx.saturating_add(d.total_transmitted()),
                    )
                });
                registry.set_io(input, output);
            }

            let summary = if mirror_processes {
                let mut mirrored = mirrored
                    .lock()
                    .map_err(|e| anyhow::anyhow!("mirror lock poisoned: {}", e))?;
                mirror(&sys, &registry, &mut mirrored)
            } else {
                SampleSummary::default()
            };

            // Mirrored RSS counts shared pages once per process, so the sum can
            // exceed host used memory. The total never drops below what the
            // categories already account for.
            let accounted = accounted_memory(&registry);
            registry.set_total_memory(sys.used_memory().max(accounted));
            Ok(summary)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

fn accounted_memory(registry: &Registry) -> u64 {
    [
        MemoryCategory::Process,
        MemoryCategory::Atom,
        MemoryCategory::Binary,
        MemoryCategory::Code,
        MemoryCategory::Ets,
    ]
    .into_iter()
    .fold(0u64, |acc, c| acc.saturating_add(registry.memory(c)))
}

fn mirror(sys: &System, registry: &Registry, mirrored: &mut HashMap<Pid, ResourceHandle>) -> SampleSummary {
    let mut summary = SampleSummary::default();
    let live: HashSet<Pid> = sys.processes().keys().copied().collect();
    mirrored.retain(|pid, handle| {
        if live.contains(pid) {
            return true;
        }
        registry.exit_process(handle);
        summary.exited += 1;
        false
    });

    for (pid, p) in sys.processes() {
        let memory = p.memory();
        let reductions = p.accumulated_cpu_time();
        let status = p.status().to_string();
        let updated = mirrored.get(pid).is_some_and(|handle| {
            registry.update_process(handle, |spec| {
                spec.memory = memory;
                spec.reductions = reductions;
                spec.status = status.clone();
            })
        });
        if updated {
            continue;
        }
        let mut spec = ProcessSpec::new(Mfa::new("os", "exec", 0))
            .named(p.name().to_string_lossy().into_owned())
            .memory(memory)
            .reductions(reductions);
        spec.status = status;
        mirrored.insert(*pid, registry.spawn_process(spec));
        summary.spawned += 1;
    }
    summary.mirrored = mirrored.len();
    summary
}
