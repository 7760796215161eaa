// RPC envelope: what a caller asks a node to run and what comes back.

use serde::{Deserialize, Serialize};

use crate::models::{Attributes, ResourceHandle, Snapshot, SnapshotQuery, SystemInfoRecord, UsageRecord};
use crate::pipeline::{self, RequestError};
use crate::runtime::NodeRuntime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    FetchProcesses { query: SnapshotQuery },
    FetchPorts { query: SnapshotQuery },
    FetchTables { query: SnapshotQuery },
    FetchSockets { query: SnapshotQuery },
    FetchProcessInfo { handle: ResourceHandle, fields: Vec<String> },
    FetchPortInfo { handle: ResourceHandle, fields: Vec<String> },
    FetchTableInfo { handle: ResourceHandle },
    FetchSocketInfo { handle: ResourceHandle, fields: Vec<String> },
    FetchSystemInfo,
    FetchSystemUsage,
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Request::FetchProcesses { .. } => "fetch_processes",
            Request::FetchPorts { .. } => "fetch_ports",
            Request::FetchTables { .. } => "fetch_tables",
            Request::FetchSockets { .. } => "fetch_sockets",
            Request::FetchProcessInfo { .. } => "fetch_process_info",
            Request::FetchPortInfo { .. } => "fetch_port_info",
            Request::FetchTableInfo { .. } => "fetch_table_info",
            Request::FetchSocketInfo { .. } => "fetch_socket_info",
            Request::FetchSystemInfo => "fetch_system_info",
            Request::FetchSystemUsage => "fetch_system_usage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
    Snapshot(Snapshot),
    /// `None` when the handle no longer exists.
    Info(Option<Attributes>),
    SystemInfo(SystemInfoRecord),
    Usage(UsageRecord),
}

/// Run one request against the local node. Blocking; call off the async reactor.
pub fn execute(rt: &dyn NodeRuntime, request: Request) -> Result<Response, RequestError> {
    Ok(match request {
        Request::FetchProcesses { query } => Response::Snapshot(pipeline::fetch_processes(rt, &query)?),
        Request::FetchPorts { query } => Response::Snapshot(pipeline::fetch_ports(rt, &query)?),
        Request::FetchTables { query } => Response::Snapshot(pipeline::fetch_tables(rt, &query)?),
        Request::FetchSockets { query } => Response::Snapshot(pipeline::fetch_sockets(rt, &query)?),
        Request::FetchProcessInfo { handle, fields } => {
            Response::Info(pipeline::fetch_process_info(rt, &handle, &fields)?)
        }
        Request::FetchPortInfo { handle, fields } => {
            Response::Info(pipeline::fetch_port_info(rt, &handle, &fields)?)
        }
        Request::FetchTableInfo { handle } => Response::Info(pipeline::fetch_table_info(rt, &handle)?),
        Request::FetchSocketInfo { handle, fields } => {
            Response::Info(pipeline::fetch_socket_info(rt, &handle, &fields)?)
        }
        Request::FetchSystemInfo => Response::SystemInfo(pipeline::fetch_system_info(rt)),
        Request::FetchSystemUsage => Response::Usage(pipeline::fetch_system_usage(rt)),
    })
}
