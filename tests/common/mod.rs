// Shared test fixtures: a populated node registry and a runtime wrapper that
// injects enumeration races, counter skew and latency.
#![allow(dead_code)]

use nodescope::models::{Attributes, ResourceHandle};
use nodescope::runtime::{
    AddressError, Counter, Descriptors, Endpoint, MemoryCategory, Mfa, NodeRuntime, PortSpec,
    ProcessSpec, Registry, SocketReadError, SocketSpec, SocketStats, TableSpec,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

pub const NODE: &str = "alpha";

pub struct Fixture {
    pub registry: Arc<Registry>,
    pub logger: ResourceHandle,
    pub worker: ResourceHandle,
    pub supervisor: ResourceHandle,
    pub conn: ResourceHandle,
    pub efile: ResourceHandle,
    pub forker: ResourceHandle,
    pub listener: ResourceHandle,
    pub client: ResourceHandle,
    pub udp: ResourceHandle,
    pub broken: ResourceHandle,
    pub users: ResourceHandle,
    pub sessions: ResourceHandle,
    pub anonymous: ResourceHandle,
}

pub fn inet(ip: IpAddr, port: u16) -> Endpoint {
    Endpoint::Inet { ip, port }
}

/// Four processes, two plain ports, four socket ports (one with unreadable stats),
/// three tables, and fixed memory counters.
pub fn fixture() -> Fixture {
    fixture_named(NODE)
}

pub fn fixture_named(node: &str) -> Fixture {
    let registry = Arc::new(Registry::new(node));

    let logger = registry.spawn_process(
        ProcessSpec::new(Mfa::new("gen_server", "init_it", 6))
            .named("logger")
            .memory(2_000)
            .reductions(500),
    );
    let worker = registry.spawn_process(
        ProcessSpec::new(Mfa::new("my_worker", "run", 1))
            .memory(5_000)
            .reductions(100)
            .message_queue_len(3),
    );
    let supervisor = registry.spawn_process(
        ProcessSpec::new(Mfa::new("proc_lib", "init_p", 5))
            .named("Registry_Sup")
            .memory(1_000)
            .reductions(900)
            .message_queue_len(7),
    );
    let conn = registry.spawn_process(
        ProcessSpec::new(Mfa::new("cowboy_clear", "connection_process", 4))
            .memory(3_000)
            .reductions(50)
            .message_queue_len(1),
    );

    let efile = registry.open_port(PortSpec::new("efile").owner(&logger).io(10, 20));
    let forker = registry.open_port(
        PortSpec::new("forker")
            .owner(&supervisor)
            .io(100, 5)
            .os_pid(4242),
    );

    let listener = registry.open_socket(
        PortSpec::new("tcp_inet").owner(&supervisor),
        SocketSpec::tcp(inet(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 4000)).flags(&[
            "open",
            "listening",
            "bound",
            "listen",
        ]),
    );
    let client = registry.open_socket(
        PortSpec::new("tcp_inet").owner(&conn),
        SocketSpec::tcp(inet(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000))
            .flags(&["connected", "bound", "open"])
            .peer(Ok(inet(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 51000)))
            .traffic(300, 700),
    );
    let udp = registry.open_socket(
        PortSpec::new("udp_inet").owner(&worker),
        SocketSpec::udp(inet(IpAddr::V6(Ipv6Addr::LOCALHOST), 53))
            .flags(&["bound", "open"])
            .traffic(10, 20),
    );
    let broken = registry.open_socket(
        PortSpec::new("tcp_inet").owner(&worker),
        SocketSpec::tcp(inet(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)), 9000)).without_stats(),
    );

    let users = registry.new_table(TableSpec::named("users").owner(&logger).size(10, 500));
    let sessions = registry.new_table(
        TableSpec::named("sessions")
            .kind("ordered_set")
            .owner(&conn)
            .size(3, 200),
    );
    let anonymous = registry.new_table(TableSpec::anonymous().owner(&worker).size(7, 300));

    registry.set_total_memory(100_000);
    registry.set_static_memory(1_000, 2_000, 3_000);
    registry.set_atoms(12_345);
    registry.set_io(4_096, 8_192);
    registry.set_uptime_ms(60_000);
    registry.set_run_queues(2, 1);

    Fixture {
        registry,
        logger,
        worker,
        supervisor,
        conn,
        efile,
        forker,
        listener,
        client,
        udp,
        broken,
        users,
        sessions,
        anonymous,
    }
}

/// Delegates to a registry, optionally enumerating ids that no longer exist,
/// skewing the live process counter, and sleeping before enumerations.
pub struct FlakyRuntime {
    pub inner: Arc<Registry>,
    pub phantom_ids: Vec<u64>,
    pub process_count_skew: u64,
    pub delay: Duration,
}

impl FlakyRuntime {
    pub fn new(inner: Arc<Registry>) -> Self {
        Self {
            inner,
            phantom_ids: vec![],
            process_count_skew: 0,
            delay: Duration::ZERO,
        }
    }

    fn enumerate(&self, mut ids: Vec<u64>) -> Vec<u64> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        ids.extend(&self.phantom_ids);
        ids
    }
}

impl NodeRuntime for FlakyRuntime {
    fn node_name(&self) -> &str {
        self.inner.node_name()
    }

    fn processes(&self) -> Vec<u64> {
        self.enumerate(self.inner.processes())
    }

    fn process_count(&self) -> u64 {
        self.inner.process_count() + self.process_count_skew
    }

    fn process_info(&self, id: u64, keys: &[&str]) -> Option<Attributes> {
        self.inner.process_info(id, keys)
    }

    fn ports(&self) -> Vec<u64> {
        self.enumerate(self.inner.ports())
    }

    fn port_info(&self, id: u64) -> Option<Attributes> {
        self.inner.port_info(id)
    }

    fn tables(&self) -> Vec<u64> {
        self.enumerate(self.inner.tables())
    }

    fn table_info(&self, id: u64) -> Option<Attributes> {
        self.inner.table_info(id)
    }

    fn socket_status(&self, port: u64) -> Result<Vec<String>, SocketReadError> {
        self.inner.socket_status(port)
    }

    fn socket_type(&self, port: u64) -> Result<String, SocketReadError> {
        self.inner.socket_type(port)
    }

    fn socket_stats(&self, port: u64) -> Result<SocketStats, SocketReadError> {
        self.inner.socket_stats(port)
    }

    fn socket_module(&self, port: u64) -> Result<String, SocketReadError> {
        self.inner.socket_module(port)
    }

    fn sockname(&self, port: u64) -> Result<Endpoint, AddressError> {
        self.inner.sockname(port)
    }

    fn peername(&self, port: u64) -> Result<Endpoint, AddressError> {
        self.inner.peername(port)
    }

    fn memory(&self, category: MemoryCategory) -> u64 {
        self.inner.memory(category)
    }

    fn counter(&self, counter: Counter) -> u64 {
        self.inner.counter(counter)
    }

    fn descriptors(&self) -> Descriptors {
        self.inner.descriptors()
    }
}
