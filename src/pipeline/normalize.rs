// Raw runtime attributes -> normalized records, one builder per resource class.
// A builder returns None when the resource vanished or no longer qualifies.

use tracing::debug;

use super::format::{format_address, format_call, format_socket_state};
use crate::models::{Attributes, NormalizedRecord, ResourceHandle, Value};
use crate::runtime::{NodeRuntime, SocketReadError, SocketStats, is_socket_driver};

/// Attributes read for every process in a listing.
pub const PROCESS_KEYS: [&str; 6] = [
    "registered_name",
    "initial_call",
    "memory",
    "reductions",
    "message_queue_len",
    "current_function",
];

const PORT_KEYS: [&str; 6] = ["name", "id", "connected", "input", "output", "os_pid"];

const TABLE_KEYS: [&str; 6] = ["name", "type", "size", "memory", "owner", "protection"];

fn fill_missing(record: &mut NormalizedRecord, keys: &[&str]) {
    for key in keys {
        record
            .entry(key.to_string())
            .or_insert_with(|| Value::atom("undefined"));
    }
}

fn driver_name(info: &Attributes) -> Option<&str> {
    info.get("name").and_then(Value::as_str)
}

pub fn process_record(rt: &dyn NodeRuntime, id: u64) -> Option<NormalizedRecord> {
    let raw = rt.process_info(id, &PROCESS_KEYS)?;
    Some(normalize_process(ResourceHandle::process(rt.node_name(), id), raw))
}

/// Adds `pid` and `name_or_initial_call`: the registered name when there is one,
/// otherwise the initial call as `module.function/arity`.
pub fn normalize_process(handle: ResourceHandle, mut raw: Attributes) -> NormalizedRecord {
    let label = match raw.get("registered_name") {
        Some(Value::Atom(name) | Value::Str(name)) if !name.is_empty() => name.clone(),
        _ => raw.get("initial_call").map(format_call).unwrap_or_default(),
    };
    fill_missing(&mut raw, &PROCESS_KEYS);
    raw.insert("pid".into(), handle.into());
    raw.insert("name_or_initial_call".into(), Value::Str(label));
    raw
}

/// Socket-backed ports are skipped; they are listed as sockets.
pub fn port_record(rt: &dyn NodeRuntime, id: u64) -> Option<NormalizedRecord> {
    let raw = rt.port_info(id)?;
    if driver_name(&raw).is_some_and(is_socket_driver) {
        return None;
    }
    Some(normalize_port(ResourceHandle::port(rt.node_name(), id), raw))
}

pub fn normalize_port(handle: ResourceHandle, mut raw: Attributes) -> NormalizedRecord {
    fill_missing(&mut raw, &PORT_KEYS);
    raw.insert("port".into(), handle.into());
    raw
}

pub fn table_record(rt: &dyn NodeRuntime, id: u64) -> Option<NormalizedRecord> {
    let raw = rt.table_info(id)?;
    Some(normalize_table(ResourceHandle::table(rt.node_name(), id), raw))
}

/// The table name becomes its printed string so named and anonymous tables sort together.
pub fn normalize_table(handle: ResourceHandle, mut raw: Attributes) -> NormalizedRecord {
    if let Some(name) = raw.get_mut("name") {
        *name = Value::Str(name.to_text());
    }
    fill_missing(&mut raw, &TABLE_KEYS);
    raw.insert("table".into(), handle.into());
    raw
}

/// Port info plus formatted endpoints, state, protocol module and byte counters.
/// Any failed status/type/stats/module read drops the whole record; a half-read
/// socket would mix fields from different moments.
pub fn socket_record(rt: &dyn NodeRuntime, id: u64) -> Option<NormalizedRecord> {
    let handle = ResourceHandle::port(rt.node_name(), id);
    let mut info = rt.port_info(id)?;
    if !driver_name(&info).is_some_and(is_socket_driver) {
        return None;
    }

    let read = || -> Result<(Vec<String>, String, SocketStats, String), SocketReadError> {
        Ok((
            rt.socket_status(id)?,
            rt.socket_type(id)?,
            rt.socket_stats(id)?,
            rt.socket_module(id)?,
        ))
    };
    let (flags, kind, stats, module) = match read() {
        Ok(parts) => parts,
        Err(e) => {
            debug!(port = %handle, error = %e, "socket skipped");
            return None;
        }
    };

    info.insert("port".into(), handle.into());
    info.insert("module".into(), Value::atom(module));
    info.insert("type".into(), Value::atom(kind));
    info.insert("state".into(), Value::Str(format_socket_state(&flags)));
    info.insert(
        "local_address".into(),
        Value::Str(format_address(&rt.sockname(id))),
    );
    info.insert(
        "foreign_address".into(),
        Value::Str(format_address(&rt.peername(id))),
    );
    info.insert("send_oct".into(), stats.send_oct.into());
    info.insert("recv_oct".into(), stats.recv_oct.into());
    Some(info)
}
