// In-process resource registry. Host code registers and drops entries as its
// processes, ports, tables and sockets come and go; the inspector reads them
// through NodeRuntime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    AddressError, Counter, Descriptors, Endpoint, MemoryCategory, NodeRuntime, SocketReadError,
    SocketStats,
};
use crate::models::{Attributes, ResourceHandle, ResourceKind, Value};

/// Module/function/arity triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mfa {
    pub module: String,
    pub function: String,
    pub arity: u32,
}

impl Mfa {
    pub fn new(module: impl Into<String>, function: impl Into<String>, arity: u32) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            arity,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Tuple(vec![
            Value::atom(&self.module),
            Value::atom(&self.function),
            Value::Int(i64::from(self.arity)),
        ])
    }
}

impl fmt::Display for Mfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.module, self.function, self.arity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub registered_name: Option<String>,
    pub initial_call: Mfa,
    pub current_function: Mfa,
    pub status: String,
    pub memory: u64,
    pub reductions: u64,
    pub message_queue_len: u64,
}

impl ProcessSpec {
    pub fn new(initial_call: Mfa) -> Self {
        Self {
            registered_name: None,
            current_function: initial_call.clone(),
            initial_call,
            status: "waiting".into(),
            memory: 0,
            reductions: 0,
            message_queue_len: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.registered_name = Some(name.into());
        self
    }

    pub fn memory(mut self, bytes: u64) -> Self {
        self.memory = bytes;
        self
    }

    pub fn reductions(mut self, reductions: u64) -> Self {
        self.reductions = reductions;
        self
    }

    pub fn message_queue_len(mut self, len: u64) -> Self {
        self.message_queue_len = len;
        self
    }

    pub fn current_function(mut self, mfa: Mfa) -> Self {
        self.current_function = mfa;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub driver: String,
    /// Id of the connected (owning) process.
    pub owner: Option<u64>,
    pub input: u64,
    pub output: u64,
    pub os_pid: Option<u64>,
}

impl PortSpec {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            owner: None,
            input: 0,
            output: 0,
            os_pid: None,
        }
    }

    pub fn owner(mut self, owner: &ResourceHandle) -> Self {
        self.owner = Some(owner.id);
        self
    }

    pub fn io(mut self, input: u64, output: u64) -> Self {
        self.input = input;
        self.output = output;
        self
    }

    pub fn os_pid(mut self, pid: u64) -> Self {
        self.os_pid = Some(pid);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSpec {
    pub flags: Vec<String>,
    pub kind: String,
    pub module: String,
    pub local: Result<Endpoint, AddressError>,
    pub peer: Result<Endpoint, AddressError>,
    pub send_oct: u64,
    pub recv_oct: u64,
    pub stats_available: bool,
}

impl SocketSpec {
    /// An open, unconnected TCP socket bound to `local`.
    pub fn tcp(local: Endpoint) -> Self {
        let module = match &local {
            Endpoint::Inet { ip, .. } if ip.is_ipv6() => "inet6_tcp",
            Endpoint::Local(_) => "local_tcp",
            _ => "inet_tcp",
        };
        Self {
            flags: vec!["open".into()],
            kind: "stream".into(),
            module: module.into(),
            local: Ok(local),
            peer: Err(AddressError::NotConnected),
            send_oct: 0,
            recv_oct: 0,
            stats_available: true,
        }
    }

    pub fn udp(local: Endpoint) -> Self {
        let module = match &local {
            Endpoint::Inet { ip, .. } if ip.is_ipv6() => "inet6_udp",
            _ => "inet_udp",
        };
        Self {
            kind: "dgram".into(),
            module: module.into(),
            ..Self::tcp(local)
        }
    }

    pub fn flags(mut self, flags: &[&str]) -> Self {
        self.flags = flags.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn peer(mut self, peer: Result<Endpoint, AddressError>) -> Self {
        self.peer = peer;
        self
    }

    pub fn traffic(mut self, send_oct: u64, recv_oct: u64) -> Self {
        self.send_oct = send_oct;
        self.recv_oct = recv_oct;
        self
    }

    pub fn without_stats(mut self) -> Self {
        self.stats_available = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableName {
    Named(String),
    /// Only reachable through its handle.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: TableName,
    pub kind: String,
    pub protection: String,
    pub owner: Option<u64>,
    pub size: u64,
    pub memory: u64,
    pub read_concurrency: bool,
    pub write_concurrency: bool,
}

impl TableSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: TableName::Named(name.into()),
            ..Self::anonymous()
        }
    }

    pub fn anonymous() -> Self {
        Self {
            name: TableName::Anonymous,
            kind: "set".into(),
            protection: "protected".into(),
            owner: None,
            size: 0,
            memory: 0,
            read_concurrency: false,
            write_concurrency: false,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn owner(mut self, owner: &ResourceHandle) -> Self {
        self.owner = Some(owner.id);
        self
    }

    pub fn size(mut self, size: u64, memory: u64) -> Self {
        self.size = size;
        self.memory = memory;
        self
    }
}

struct PortEntry {
    spec: PortSpec,
    socket: Option<SocketSpec>,
}

#[derive(Default)]
struct Entries {
    processes: BTreeMap<u64, ProcessSpec>,
    ports: BTreeMap<u64, PortEntry>,
    tables: BTreeMap<u64, TableSpec>,
}

/// Host-fed counters. Each is its own atomic; there is no consistent cut across them.
#[derive(Default)]
struct Gauges {
    total_memory: AtomicU64,
    atom_memory: AtomicU64,
    binary_memory: AtomicU64,
    code_memory: AtomicU64,
    atoms: AtomicU64,
    io_input: AtomicU64,
    io_output: AtomicU64,
    uptime_ms: AtomicU64,
    total_run_queue: AtomicU64,
    cpu_run_queue: AtomicU64,
}

pub struct Registry {
    node: String,
    next_id: AtomicU64,
    entries: RwLock<Entries>,
    gauges: Gauges,
    descriptors: RwLock<Descriptors>,
}

impl Registry {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Entries::default()),
            gauges: Gauges::default(),
            descriptors: RwLock::new(Descriptors::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn local_id(&self, handle: &ResourceHandle, kind: ResourceKind) -> Option<u64> {
        (handle.node == self.node && handle.kind == kind).then_some(handle.id)
    }

    pub fn spawn_process(&self, spec: ProcessSpec) -> ResourceHandle {
        let id = self.allocate();
        self.write().processes.insert(id, spec);
        ResourceHandle::process(&self.node, id)
    }

    /// Returns false when the process is gone.
    pub fn update_process(&self, handle: &ResourceHandle, f: impl FnOnce(&mut ProcessSpec)) -> bool {
        let Some(id) = self.local_id(handle, ResourceKind::Process) else {
            return false;
        };
        match self.write().processes.get_mut(&id) {
            Some(spec) => {
                f(spec);
                true
            }
            None => false,
        }
    }

    pub fn exit_process(&self, handle: &ResourceHandle) -> bool {
        self.local_id(handle, ResourceKind::Process)
            .is_some_and(|id| self.write().processes.remove(&id).is_some())
    }

    pub fn open_port(&self, spec: PortSpec) -> ResourceHandle {
        let id = self.allocate();
        self.write().ports.insert(id, PortEntry { spec, socket: None });
        ResourceHandle::port(&self.node, id)
    }

    pub fn open_socket(&self, port: PortSpec, socket: SocketSpec) -> ResourceHandle {
        let id = self.allocate();
        self.write().ports.insert(
            id,
            PortEntry {
                spec: port,
                socket: Some(socket),
            },
        );
        ResourceHandle::port(&self.node, id)
    }

    pub fn update_socket(&self, handle: &ResourceHandle, f: impl FnOnce(&mut SocketSpec)) -> bool {
        let Some(id) = self.local_id(handle, ResourceKind::Port) else {
            return false;
        };
        match self
            .write()
            .ports
            .get_mut(&id)
            .and_then(|p| p.socket.as_mut())
        {
            Some(socket) => {
                f(socket);
                true
            }
            None => false,
        }
    }

    pub fn close_port(&self, handle: &ResourceHandle) -> bool {
        self.local_id(handle, ResourceKind::Port)
            .is_some_and(|id| self.write().ports.remove(&id).is_some())
    }

    pub fn new_table(&self, spec: TableSpec) -> ResourceHandle {
        let id = self.allocate();
        self.write().tables.insert(id, spec);
        ResourceHandle::table(&self.node, id)
    }

    pub fn delete_table(&self, handle: &ResourceHandle) -> bool {
        self.local_id(handle, ResourceKind::Table)
            .is_some_and(|id| self.write().tables.remove(&id).is_some())
    }

    pub fn set_total_memory(&self, bytes: u64) {
        self.gauges.total_memory.store(bytes, Ordering::Relaxed);
    }

    /// Memory not owned by processes or tables.
    pub fn set_static_memory(&self, atom: u64, binary: u64, code: u64) {
        self.gauges.atom_memory.store(atom, Ordering::Relaxed);
        self.gauges.binary_memory.store(binary, Ordering::Relaxed);
        self.gauges.code_memory.store(code, Ordering::Relaxed);
    }

    pub fn set_atoms(&self, count: u64) {
        self.gauges.atoms.store(count, Ordering::Relaxed);
    }

    pub fn set_io(&self, input: u64, output: u64) {
        self.gauges.io_input.store(input, Ordering::Relaxed);
        self.gauges.io_output.store(output, Ordering::Relaxed);
    }

    pub fn set_uptime_ms(&self, ms: u64) {
        self.gauges.uptime_ms.store(ms, Ordering::Relaxed);
    }

    pub fn set_run_queues(&self, total: u64, cpu: u64) {
        self.gauges.total_run_queue.store(total, Ordering::Relaxed);
        self.gauges.cpu_run_queue.store(cpu, Ordering::Relaxed);
    }

    pub fn set_descriptors(&self, descriptors: Descriptors) {
        *self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner) = descriptors;
    }

    fn owner_value(&self, owner: Option<u64>) -> Value {
        match owner {
            Some(id) => ResourceHandle::process(&self.node, id).into(),
            None => Value::atom("undefined"),
        }
    }

    fn with_socket<T>(
        &self,
        port: u64,
        f: impl FnOnce(&SocketSpec) -> Result<T, SocketReadError>,
    ) -> Result<T, SocketReadError> {
        let entries = self.read();
        let entry = entries.ports.get(&port).ok_or(SocketReadError::Closed)?;
        let socket = entry.socket.as_ref().ok_or(SocketReadError::NotSocket)?;
        f(socket)
    }

    fn endpoint(
        &self,
        port: u64,
        f: impl FnOnce(&SocketSpec) -> Result<Endpoint, AddressError>,
    ) -> Result<Endpoint, AddressError> {
        let entries = self.read();
        let entry = entries
            .ports
            .get(&port)
            .ok_or_else(|| AddressError::Other("einval".into()))?;
        let socket = entry
            .socket
            .as_ref()
            .ok_or_else(|| AddressError::Other("enotsock".into()))?;
        f(socket)
    }
}

impl NodeRuntime for Registry {
    fn node_name(&self) -> &str {
        &self.node
    }

    fn processes(&self) -> Vec<u64> {
        self.read().processes.keys().copied().collect()
    }

    fn process_count(&self) -> u64 {
        self.read().processes.len() as u64
    }

    fn process_info(&self, id: u64, keys: &[&str]) -> Option<Attributes> {
        let entries = self.read();
        let spec = entries.processes.get(&id)?;
        let mut info = Attributes::new();
        for key in keys {
            let value = match *key {
                "registered_name" => match &spec.registered_name {
                    Some(name) => Value::atom(name),
                    None => Value::List(vec![]),
                },
                "initial_call" => spec.initial_call.to_value(),
                "current_function" => spec.current_function.to_value(),
                "status" => Value::atom(&spec.status),
                "memory" => spec.memory.into(),
                "reductions" => spec.reductions.into(),
                "message_queue_len" => spec.message_queue_len.into(),
                _ => continue,
            };
            info.insert(key.to_string(), value);
        }
        Some(info)
    }

    fn ports(&self) -> Vec<u64> {
        self.read().ports.keys().copied().collect()
    }

    fn port_info(&self, id: u64) -> Option<Attributes> {
        let entries = self.read();
        let port = &entries.ports.get(&id)?.spec;
        let mut info = Attributes::new();
        info.insert("name".into(), port.driver.as_str().into());
        info.insert("id".into(), id.into());
        info.insert("connected".into(), self.owner_value(port.owner));
        info.insert("input".into(), port.input.into());
        info.insert("output".into(), port.output.into());
        info.insert(
            "os_pid".into(),
            port.os_pid
                .map_or_else(|| Value::atom("undefined"), Value::from),
        );
        Some(info)
    }

    fn tables(&self) -> Vec<u64> {
        self.read().tables.keys().copied().collect()
    }

    fn table_info(&self, id: u64) -> Option<Attributes> {
        let entries = self.read();
        let table = entries.tables.get(&id)?;
        let handle = ResourceHandle::table(&self.node, id);
        let mut info = Attributes::new();
        let (name, named) = match &table.name {
            TableName::Named(name) => (Value::atom(name), true),
            TableName::Anonymous => (handle.clone().into(), false),
        };
        info.insert("id".into(), handle.into());
        info.insert("name".into(), name);
        info.insert("named_table".into(), named.into());
        info.insert("type".into(), Value::atom(&table.kind));
        info.insert("protection".into(), Value::atom(&table.protection));
        info.insert("owner".into(), self.owner_value(table.owner));
        info.insert("size".into(), table.size.into());
        info.insert("memory".into(), table.memory.into());
        info.insert("read_concurrency".into(), table.read_concurrency.into());
        info.insert("write_concurrency".into(), table.write_concurrency.into());
        Some(info)
    }

    fn socket_status(&self, port: u64) -> Result<Vec<String>, SocketReadError> {
        self.with_socket(port, |s| Ok(s.flags.clone()))
    }

    fn socket_type(&self, port: u64) -> Result<String, SocketReadError> {
        self.with_socket(port, |s| Ok(s.kind.clone()))
    }

    fn socket_stats(&self, port: u64) -> Result<SocketStats, SocketReadError> {
        self.with_socket(port, |s| {
            if !s.stats_available {
                return Err(SocketReadError::StatsUnavailable);
            }
            Ok(SocketStats {
                send_oct: s.send_oct,
                recv_oct: s.recv_oct,
            })
        })
    }

    fn socket_module(&self, port: u64) -> Result<String, SocketReadError> {
        self.with_socket(port, |s| Ok(s.module.clone()))
    }

    fn sockname(&self, port: u64) -> Result<Endpoint, AddressError> {
        self.endpoint(port, |s| s.local.clone())
    }

    fn peername(&self, port: u64) -> Result<Endpoint, AddressError> {
        self.endpoint(port, |s| s.peer.clone())
    }

    fn memory(&self, category: MemoryCategory) -> u64 {
        let g = &self.gauges;
        match category {
            MemoryCategory::Total => g.total_memory.load(Ordering::Relaxed),
            MemoryCategory::Process => self.read().processes.values().map(|p| p.memory).sum(),
            MemoryCategory::Atom => g.atom_memory.load(Ordering::Relaxed),
            MemoryCategory::Binary => g.binary_memory.load(Ordering::Relaxed),
            MemoryCategory::Code => g.code_memory.load(Ordering::Relaxed),
            MemoryCategory::Ets => self.read().tables.values().map(|t| t.memory).sum(),
        }
    }

    fn counter(&self, counter: Counter) -> u64 {
        let g = &self.gauges;
        match counter {
            Counter::Atoms => g.atoms.load(Ordering::Relaxed),
            Counter::Ports => self.read().ports.len() as u64,
            Counter::Processes => self.process_count(),
            Counter::Tables => self.read().tables.len() as u64,
            Counter::IoInput => g.io_input.load(Ordering::Relaxed),
            Counter::IoOutput => g.io_output.load(Ordering::Relaxed),
            Counter::UptimeMs => g.uptime_ms.load(Ordering::Relaxed),
            Counter::TotalRunQueue => g.total_run_queue.load(Ordering::Relaxed),
            Counter::CpuRunQueue => g.cpu_run_queue.load(Ordering::Relaxed),
        }
    }

    fn descriptors(&self) -> Descriptors {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
