// System usage and system info tests

mod common;

use common::fixture;
use nodescope::models::{MemoryUsage, SnapshotQuery, SortDirection, SystemLimits};
use nodescope::pipeline;
use nodescope::runtime::{Descriptors, Mfa, ProcessSpec, TableSpec};

#[test]
fn test_usage_counts_and_memory_breakdown() {
    let fx = fixture();
    let usage = pipeline::fetch_system_usage(&*fx.registry);
    assert_eq!(usage.processes, 4);
    assert_eq!(usage.ports, 6);
    assert_eq!(usage.tables, 3);
    assert_eq!(usage.atoms, 12_345);
    assert_eq!(usage.io.input, 4_096);
    assert_eq!(usage.io.output, 8_192);
    assert_eq!(usage.uptime_ms, 60_000);
    assert_eq!(usage.total_run_queue, 2);
    assert_eq!(usage.cpu_run_queue, 1);

    let m = usage.memory;
    assert_eq!(m.total, 100_000);
    assert_eq!(m.process, 11_000);
    assert_eq!(m.ets, 1_000);
    assert_eq!((m.atom, m.binary, m.code), (1_000, 2_000, 3_000));
    assert_eq!(m.other, 82_000);
}

#[test]
fn test_other_is_total_minus_categories() {
    let fx = fixture();
    fx.registry.spawn_process(ProcessSpec::new(Mfa::new("big", "alloc", 0)).memory(7_777));
    fx.registry.new_table(TableSpec::named("cache").size(1, 333));
    let m = pipeline::fetch_system_usage(&*fx.registry).memory;
    let accounted = m.process + m.atom + m.binary + m.code + m.ets;
    assert_eq!(m.other, m.total as i64 - accounted as i64);
}

#[test]
fn test_other_goes_negative_when_categories_exceed_total() {
    let m = MemoryUsage::from_counters(1_000, 600, 100, 200, 150, 50);
    assert_eq!(m.other, -100);
}

#[test]
fn test_other_saturates_on_huge_counters() {
    let m = MemoryUsage::from_counters(0, u64::MAX, u64::MAX, 0, 0, 0);
    assert_eq!(m.other, i64::MIN);
}

#[test]
fn test_usage_and_query_share_snake_case_wire_names() {
    let fx = fixture();
    let usage = pipeline::fetch_system_usage(&*fx.registry);
    let json = serde_json::to_value(usage).unwrap();
    assert_eq!(json["uptime_ms"], 60_000);
    assert_eq!(json["total_run_queue"], 2);
    assert_eq!(json["cpu_run_queue"], 1);
    assert_eq!(json["memory"]["other"], 82_000);
    assert!(json.get("uptimeMs").is_none());

    let info = serde_json::to_value(pipeline::fetch_system_info(&*fx.registry)).unwrap();
    for key in ["runtime_version", "system_banner", "os_name", "cpu_model"] {
        assert!(info.get(key).is_some(), "missing {}", key);
    }

    let query = serde_json::to_value(SnapshotQuery::new("memory", SortDirection::Asc, 1)).unwrap();
    assert!(query.get("sort_by").is_some());
    assert!(query.get("sort_dir").is_some());
}

#[test]
fn test_system_info_combines_descriptors_and_usage() {
    let fx = fixture();
    let limits = SystemLimits {
        atoms: 1_048_576,
        ports: 65_536,
        processes: 262_144,
        ets: 8_192,
    };
    fx.registry.set_descriptors(Descriptors {
        runtime_version: "0.3.0".into(),
        system_banner: "nodescope 0.3.0 [x86_64-linux] [schedulers:8]".into(),
        os_name: "Debian GNU/Linux 12 (bookworm)".into(),
        cpu_model: "Test CPU".into(),
        schedulers: 8,
        limits,
    });
    let info = pipeline::fetch_system_info(&*fx.registry);
    assert_eq!(info.node, "alpha");
    assert_eq!(info.runtime_version, "0.3.0");
    assert_eq!(info.cpu_model, "Test CPU");
    assert_eq!(info.schedulers, 8);
    assert_eq!(info.limits, limits);
    assert_eq!(info.usage.processes, 4);
}

#[test]
fn test_system_info_defaults_before_descriptors_are_set() {
    let fx = fixture();
    let info = pipeline::fetch_system_info(&*fx.registry);
    assert_eq!(info.schedulers, 0);
    assert!(info.os_name.is_empty());
    assert_eq!(info.usage.memory.total, 100_000);
}
