// Snapshot pipeline tests: fetch, filter, sort and paginate per resource class

mod common;

use common::{FlakyRuntime, fixture};
use nodescope::models::{
    NormalizedRecord, ResourceHandle, Snapshot, SnapshotQuery, SortDirection, Value,
};
use nodescope::pipeline::{self, RequestError, ResourceClass};
use nodescope::runtime::{Mfa, NodeRuntime, ProcessSpec, Registry};
use std::sync::Arc;

fn query(sort_by: &str, dir: SortDirection, limit: usize) -> SnapshotQuery {
    SnapshotQuery::new(sort_by, dir, limit)
}

fn handles(snapshot: &Snapshot, key: &str) -> Vec<ResourceHandle> {
    snapshot
        .records
        .iter()
        .map(|r| match r.get(key) {
            Some(Value::Handle(h)) => h.clone(),
            other => panic!("{} is not a handle: {:?}", key, other),
        })
        .collect()
}

fn texts(snapshot: &Snapshot, key: &str) -> Vec<String> {
    snapshot
        .records
        .iter()
        .map(|r| r.get(key).map(Value::to_text).unwrap_or_default())
        .collect()
}

type Fetch = fn(&dyn NodeRuntime, &SnapshotQuery) -> Result<Snapshot, RequestError>;

fn all_classes() -> [(ResourceClass, Fetch, &'static str); 4] {
    [
        (ResourceClass::Process, pipeline::fetch_processes, "memory"),
        (ResourceClass::Port, pipeline::fetch_ports, "id"),
        (ResourceClass::Table, pipeline::fetch_tables, "size"),
        (ResourceClass::Socket, pipeline::fetch_sockets, "recv_oct"),
    ]
}

#[test]
fn test_record_count_is_min_of_total_and_limit() {
    let fx = fixture();
    for (class, fetch, sort_by) in all_classes() {
        for limit in 0..=6 {
            let s = fetch(&*fx.registry, &query(sort_by, SortDirection::Desc, limit)).unwrap();
            assert_eq!(
                s.records.len(),
                s.total.min(limit),
                "{} with limit {}",
                class,
                limit
            );
        }
    }
}

#[test]
fn test_limit_zero_returns_no_records_but_full_total() {
    let fx = fixture();
    let expected = [4, 2, 3, 3];
    for ((class, fetch, sort_by), total) in all_classes().into_iter().zip(expected) {
        let s = fetch(&*fx.registry, &query(sort_by, SortDirection::Asc, 0)).unwrap();
        assert!(s.records.is_empty(), "{}", class);
        assert_eq!(s.total, total, "{}", class);
    }
}

#[test]
fn test_process_snapshot_sorted_by_memory_desc() {
    let fx = fixture();
    let s = pipeline::fetch_processes(&*fx.registry, &query("memory", SortDirection::Desc, 2))
        .unwrap();
    assert_eq!(s.total, 4);
    assert_eq!(handles(&s, "pid"), vec![fx.worker.clone(), fx.conn.clone()]);
}

#[test]
fn test_process_records_carry_normalized_fields() {
    let fx = fixture();
    let s = pipeline::fetch_processes(&*fx.registry, &query("memory", SortDirection::Asc, 10))
        .unwrap();
    let labels = texts(&s, "name_or_initial_call");
    assert_eq!(
        labels,
        vec![
            "Registry_Sup",
            "logger",
            "cowboy_clear.connection_process/4",
            "my_worker.run/1",
        ]
    );
    for record in &s.records {
        for key in ["pid", "memory", "reductions", "message_queue_len", "initial_call"] {
            assert!(record.contains_key(key), "missing {}", key);
        }
    }
}

#[test]
fn test_asc_and_desc_are_reverses_without_ties() {
    let fx = fixture();
    let asc = pipeline::fetch_processes(&*fx.registry, &query("reductions", SortDirection::Asc, 10))
        .unwrap();
    let desc =
        pipeline::fetch_processes(&*fx.registry, &query("reductions", SortDirection::Desc, 10))
            .unwrap();
    let mut reversed = handles(&desc, "pid");
    reversed.reverse();
    assert_eq!(handles(&asc, "pid"), reversed);
    assert_eq!(
        texts(&asc, "reductions"),
        vec!["50", "100", "500", "900"]
    );
}

#[test]
fn test_equal_keys_keep_enumeration_order_in_both_directions() {
    let registry = Registry::new("alpha");
    let spawned: Vec<ResourceHandle> = (0..3)
        .map(|i| {
            registry.spawn_process(
                ProcessSpec::new(Mfa::new("worker", "loop", i))
                    .memory(1_024)
                    .reductions(u64::from(i)),
            )
        })
        .collect();
    for dir in [SortDirection::Asc, SortDirection::Desc] {
        let s = pipeline::fetch_processes(&registry, &query("memory", dir, 10)).unwrap();
        assert_eq!(handles(&s, "pid"), spawned, "{:?}", dir);
    }
}

#[test]
fn test_search_is_case_insensitive_and_counts_matches() {
    let fx = fixture();
    let q = query("memory", SortDirection::Desc, 10).with_search("  WORKER ");
    let s = pipeline::fetch_processes(&*fx.registry, &q).unwrap();
    assert_eq!(s.total, 1);
    assert_eq!(handles(&s, "pid"), vec![fx.worker.clone()]);
}

#[test]
fn test_search_matches_handle_text() {
    let fx = fixture();
    let q = query("memory", SortDirection::Desc, 10).with_search("#pid<alpha.");
    let s = pipeline::fetch_processes(&*fx.registry, &q).unwrap();
    assert_eq!(s.total, 4);
}

#[test]
fn test_blank_search_means_no_filter() {
    let fx = fixture();
    let q = query("memory", SortDirection::Desc, 10).with_search("   ");
    let s = pipeline::fetch_processes(&*fx.registry, &q).unwrap();
    assert_eq!(s.total, 4);
    assert_eq!(s.records.len(), 4);
}

#[test]
fn test_filtered_records_are_subset_of_unfiltered() {
    let fx = fixture();
    let unfiltered =
        pipeline::fetch_processes(&*fx.registry, &query("memory", SortDirection::Desc, 10))
            .unwrap();
    let q = query("memory", SortDirection::Desc, 10).with_search("o");
    let filtered = pipeline::fetch_processes(&*fx.registry, &q).unwrap();
    assert!(filtered.total <= unfiltered.total);
    for record in &filtered.records {
        assert!(unfiltered.records.contains(record));
        let hit = ["pid", "name_or_initial_call"].iter().any(|k| {
            record
                .get(*k)
                .is_some_and(|v| v.to_text().to_lowercase().contains('o'))
        });
        assert!(hit);
    }
}

#[test]
fn test_process_total_uses_live_counter_without_search() {
    let fx = fixture();
    let mut rt = FlakyRuntime::new(fx.registry.clone());
    rt.process_count_skew = 3;
    let s = pipeline::fetch_processes(&rt, &query("memory", SortDirection::Desc, 10)).unwrap();
    assert_eq!(s.records.len(), 4);
    assert_eq!(s.total, 7);

    let q = query("memory", SortDirection::Desc, 10).with_search("alpha");
    let s = pipeline::fetch_processes(&rt, &q).unwrap();
    assert_eq!(s.total, 4);
}

#[test]
fn test_vanished_resources_are_silently_excluded() {
    let fx = fixture();
    let mut rt = FlakyRuntime::new(fx.registry.clone());
    rt.phantom_ids = vec![9_001, 9_002];
    let procs = pipeline::fetch_processes(&rt, &query("memory", SortDirection::Desc, 10)).unwrap();
    assert_eq!(procs.records.len(), 4);
    let ports = pipeline::fetch_ports(&rt, &query("id", SortDirection::Desc, 10)).unwrap();
    assert_eq!(ports.total, 2);
    let tables = pipeline::fetch_tables(&rt, &query("size", SortDirection::Desc, 10)).unwrap();
    assert_eq!(tables.total, 3);
    let sockets = pipeline::fetch_sockets(&rt, &query("state", SortDirection::Desc, 10)).unwrap();
    assert_eq!(sockets.total, 3);
}

#[test]
fn test_exited_process_disappears_from_next_snapshot() {
    let fx = fixture();
    assert!(fx.registry.exit_process(&fx.worker));
    let s = pipeline::fetch_processes(&*fx.registry, &query("memory", SortDirection::Desc, 10))
        .unwrap();
    assert_eq!(s.total, 3);
    assert!(!handles(&s, "pid").contains(&fx.worker));
}

#[test]
fn test_port_snapshot_excludes_socket_ports() {
    let fx = fixture();
    let s = pipeline::fetch_ports(&*fx.registry, &query("id", SortDirection::Asc, 10)).unwrap();
    assert_eq!(handles(&s, "port"), vec![fx.efile.clone(), fx.forker.clone()]);
    assert_eq!(texts(&s, "name"), vec!["efile", "forker"]);
}

#[test]
fn test_port_sort_tolerates_mixed_types() {
    let fx = fixture();
    let desc = pipeline::fetch_ports(&*fx.registry, &query("os_pid", SortDirection::Desc, 10))
        .unwrap();
    assert_eq!(texts(&desc, "os_pid"), vec!["4242", "undefined"]);
    let asc =
        pipeline::fetch_ports(&*fx.registry, &query("os_pid", SortDirection::Asc, 10)).unwrap();
    assert_eq!(texts(&asc, "os_pid"), vec!["undefined", "4242"]);
}

#[test]
fn test_table_snapshot_names_are_text() {
    let fx = fixture();
    let s = pipeline::fetch_tables(&*fx.registry, &query("size", SortDirection::Desc, 10))
        .unwrap();
    assert_eq!(
        handles(&s, "table"),
        vec![fx.users.clone(), fx.anonymous.clone(), fx.sessions.clone()]
    );
    for record in &s.records {
        assert!(matches!(record.get("name"), Some(Value::Str(_))));
    }
    let names = texts(&s, "name");
    assert_eq!(names[0], "users");
    assert_eq!(names[1], fx.anonymous.to_string());
    assert_eq!(names[2], "sessions");
}

#[test]
fn test_table_search_by_name() {
    let fx = fixture();
    let q = query("name", SortDirection::Asc, 10).with_search("sess");
    let s = pipeline::fetch_tables(&*fx.registry, &q).unwrap();
    assert_eq!(s.total, 1);
    assert_eq!(handles(&s, "table"), vec![fx.sessions.clone()]);
}

#[test]
fn test_socket_snapshot_formats_endpoints_and_state() {
    let fx = fixture();
    let s = pipeline::fetch_sockets(&*fx.registry, &query("recv_oct", SortDirection::Desc, 10))
        .unwrap();
    assert_eq!(s.total, 3);
    assert_eq!(
        handles(&s, "port"),
        vec![fx.client.clone(), fx.udp.clone(), fx.listener.clone()]
    );
    assert_eq!(
        texts(&s, "local_address"),
        vec!["localhost:4000", "localhost:53", "*:4000"]
    );
    assert_eq!(
        texts(&s, "foreign_address"),
        vec!["10.0.0.5:51000", "*:*", "*:*"]
    );
    assert_eq!(texts(&s, "state"), vec!["CONNECTED", "BOUND", "LISTENING"]);
    assert_eq!(texts(&s, "module"), vec!["inet_tcp", "inet6_udp", "inet_tcp"]);
    assert_eq!(texts(&s, "type"), vec!["stream", "dgram", "stream"]);
}

#[test]
fn test_socket_with_unreadable_stats_is_dropped() {
    let fx = fixture();
    let s = pipeline::fetch_sockets(&*fx.registry, &query("state", SortDirection::Asc, 10))
        .unwrap();
    assert!(!handles(&s, "port").contains(&fx.broken));
}

#[test]
fn test_socket_sort_by_text_field() {
    let fx = fixture();
    let s = pipeline::fetch_sockets(
        &*fx.registry,
        &query("local_address", SortDirection::Asc, 10),
    )
    .unwrap();
    assert_eq!(
        texts(&s, "local_address"),
        vec!["*:4000", "localhost:4000", "localhost:53"]
    );
}

#[test]
fn test_socket_search_by_foreign_address() {
    let fx = fixture();
    let q = query("recv_oct", SortDirection::Desc, 10).with_search("10.0.0");
    let s = pipeline::fetch_sockets(&*fx.registry, &q).unwrap();
    assert_eq!(s.total, 1);
    assert_eq!(handles(&s, "port"), vec![fx.client.clone()]);
}

#[test]
fn test_unknown_sort_field_is_rejected() {
    let fx = fixture();
    let err = pipeline::fetch_processes(&*fx.registry, &query("colour", SortDirection::Desc, 10))
        .unwrap_err();
    assert_eq!(
        err,
        RequestError::UnknownSortField {
            class: ResourceClass::Process,
            field: "colour".into(),
        }
    );
    // Valid for sockets, not for ports.
    assert!(pipeline::fetch_ports(&*fx.registry, &query("state", SortDirection::Asc, 1)).is_err());
}

#[test]
fn test_every_advertised_sort_field_is_accepted() {
    let fx = fixture();
    for (class, fetch, _) in all_classes() {
        for field in class.sort_fields() {
            let s = fetch(&*fx.registry, &query(field, SortDirection::Asc, 10));
            assert!(s.is_ok(), "{} by {}", class, field);
        }
    }
}

#[test]
fn test_records_of_a_class_share_key_set() {
    let fx = fixture();
    let registry: Arc<Registry> = fx.registry.clone();
    let s = pipeline::fetch_ports(&*registry, &query("id", SortDirection::Asc, 10)).unwrap();
    let keys = |r: &NormalizedRecord| r.keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&s.records[0]), keys(&s.records[1]));
}
