// Node-side pipeline: enumerate -> normalize -> filter -> count -> sort -> truncate,
// plus single-resource lookups and usage aggregation. Everything here runs on the
// node that owns the resources and is a plain synchronous pass over NodeRuntime.

mod detail;
pub mod filter;
pub mod format;
pub mod normalize;
mod snapshot;
pub mod sort;
mod usage;

pub use detail::{fetch_port_info, fetch_process_info, fetch_socket_info, fetch_table_info};
pub use snapshot::{fetch_ports, fetch_processes, fetch_sockets, fetch_tables};
pub use usage::{fetch_system_info, fetch_system_usage};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Process,
    Port,
    Table,
    Socket,
}

impl ResourceClass {
    /// Fields a snapshot of this class may be sorted by.
    pub fn sort_fields(self) -> &'static [&'static str] {
        match self {
            ResourceClass::Process => &[
                "memory",
                "reductions",
                "message_queue_len",
                "name_or_initial_call",
            ],
            ResourceClass::Port => &["name", "id", "input", "output", "os_pid"],
            ResourceClass::Table => &["name", "type", "size", "memory", "protection"],
            ResourceClass::Socket => &[
                "local_address",
                "foreign_address",
                "state",
                "module",
                "type",
                "send_oct",
                "recv_oct",
            ],
        }
    }

    /// Fields a search term is matched against.
    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            ResourceClass::Process => &["pid", "name_or_initial_call"],
            ResourceClass::Port => &["port", "name"],
            ResourceClass::Table => &["name"],
            ResourceClass::Socket => &["local_address", "foreign_address"],
        }
    }

    pub fn handle_kind(self) -> ResourceKind {
        match self {
            ResourceClass::Process => ResourceKind::Process,
            ResourceClass::Port | ResourceClass::Socket => ResourceKind::Port,
            ResourceClass::Table => ResourceKind::Table,
        }
    }

    fn check_sort_field(self, field: &str) -> Result<(), RequestError> {
        if self.sort_fields().contains(&field) {
            Ok(())
        } else {
            Err(RequestError::UnknownSortField {
                class: self,
                field: field.to_string(),
            })
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceClass::Process => "process",
            ResourceClass::Port => "port",
            ResourceClass::Table => "table",
            ResourceClass::Socket => "socket",
        };
        f.write_str(name)
    }
}

/// Malformed request arguments. Never raised for resources that have gone away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("cannot sort {class} snapshot by '{field}'")]
    UnknownSortField { class: ResourceClass, field: String },
    #[error("handle {handle} is not a {class} handle")]
    WrongHandleKind { class: ResourceClass, handle: String },
    #[error("handle {handle} belongs to another node than {node}")]
    ForeignHandle { node: String, handle: String },
}
