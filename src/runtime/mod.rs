// Node runtime seam: the enumeration primitives and counters the pipeline reads.
// Every read is a best-effort look at live state; ids handed out by an enumeration
// may already be gone by the time they are looked up.

mod registry;

pub use registry::{Mfa, PortSpec, ProcessSpec, Registry, SocketSpec, TableName, TableSpec};

use crate::models::{Attributes, SystemLimits};
use std::net::IpAddr;

/// Driver names of ports that are network sockets.
pub const SOCKET_DRIVERS: [&str; 3] = ["tcp_inet", "udp_inet", "sctp_inet"];

pub fn is_socket_driver(name: &str) -> bool {
    SOCKET_DRIVERS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryCategory {
    Total,
    Process,
    Atom,
    Binary,
    Code,
    Ets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Atoms,
    Ports,
    Processes,
    Tables,
    IoInput,
    IoOutput,
    UptimeMs,
    TotalRunQueue,
    CpuRunQueue,
}

/// Slow-changing descriptive fields of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptors {
    pub runtime_version: String,
    pub system_banner: String,
    pub os_name: String,
    pub cpu_model: String,
    pub schedulers: u32,
    pub limits: SystemLimits,
}

/// One end of a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Inet { ip: IpAddr, port: u16 },
    /// Unix-domain path.
    Local(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("socket is not connected")]
    NotConnected,
    #[error("address read failed: {0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocketReadError {
    #[error("port is closed")]
    Closed,
    #[error("port is not a socket")]
    NotSocket,
    #[error("socket statistics unavailable")]
    StatsUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocketStats {
    pub send_oct: u64,
    pub recv_oct: u64,
}

/// Read-only view of one node's live resources.
///
/// Ids are node-local; `None`/`Err` from any lookup means the resource is gone or
/// the read does not apply to it.
pub trait NodeRuntime: Send + Sync {
    fn node_name(&self) -> &str;

    fn processes(&self) -> Vec<u64>;
    /// Live process counter, maintained by the runtime rather than counted per call.
    fn process_count(&self) -> u64;
    /// Only the requested keys that the runtime knows are returned.
    fn process_info(&self, id: u64, keys: &[&str]) -> Option<Attributes>;

    fn ports(&self) -> Vec<u64>;
    fn port_info(&self, id: u64) -> Option<Attributes>;

    fn tables(&self) -> Vec<u64>;
    fn table_info(&self, id: u64) -> Option<Attributes>;

    /// Status flags of a socket port, unsorted.
    fn socket_status(&self, port: u64) -> Result<Vec<String>, SocketReadError>;
    fn socket_type(&self, port: u64) -> Result<String, SocketReadError>;
    fn socket_stats(&self, port: u64) -> Result<SocketStats, SocketReadError>;
    /// Protocol module label, e.g. `inet_tcp`.
    fn socket_module(&self, port: u64) -> Result<String, SocketReadError>;
    fn sockname(&self, port: u64) -> Result<Endpoint, AddressError>;
    fn peername(&self, port: u64) -> Result<Endpoint, AddressError>;

    fn memory(&self, category: MemoryCategory) -> u64;
    fn counter(&self, counter: Counter) -> u64;
    fn descriptors(&self) -> Descriptors;
}
