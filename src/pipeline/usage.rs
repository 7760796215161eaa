// Usage aggregation.
//
// Each counter is a separate read with nothing holding the others still, so a
// record taken under heavy allocation can be internally inconsistent (memory
// categories summing past `total`, leaving `other` negative). The runtime offers
// no lock spanning its counters; this is reported as-is.

use tracing::instrument;

use crate::models::{IoUsage, MemoryUsage, SystemInfoRecord, UsageRecord};
use crate::runtime::{Counter, MemoryCategory, NodeRuntime};

#[instrument(skip(rt), fields(node = rt.node_name(), operation = "fetch_system_usage"))]
pub fn fetch_system_usage(rt: &dyn NodeRuntime) -> UsageRecord {
    UsageRecord {
        atoms: rt.counter(Counter::Atoms),
        ports: rt.counter(Counter::Ports),
        processes: rt.counter(Counter::Processes),
        tables: rt.counter(Counter::Tables),
        io: IoUsage {
            input: rt.counter(Counter::IoInput),
            output: rt.counter(Counter::IoOutput),
        },
        uptime_ms: rt.counter(Counter::UptimeMs),
        total_run_queue: rt.counter(Counter::TotalRunQueue),
        cpu_run_queue: rt.counter(Counter::CpuRunQueue),
        memory: MemoryUsage::from_counters(
            rt.memory(MemoryCategory::Total),
            rt.memory(MemoryCategory::Process),
            rt.memory(MemoryCategory::Atom),
            rt.memory(MemoryCategory::Binary),
            rt.memory(MemoryCategory::Code),
            rt.memory(MemoryCategory::Ets),
        ),
    }
}

#[instrument(skip(rt), fields(node = rt.node_name(), operation = "fetch_system_info"))]
pub fn fetch_system_info(rt: &dyn NodeRuntime) -> SystemInfoRecord {
    let d = rt.descriptors();
    SystemInfoRecord {
        node: rt.node_name().to_string(),
        runtime_version: d.runtime_version,
        system_banner: d.system_banner,
        os_name: d.os_name,
        cpu_model: d.cpu_model,
        schedulers: d.schedulers,
        limits: d.limits,
        usage: fetch_system_usage(rt),
    }
}
