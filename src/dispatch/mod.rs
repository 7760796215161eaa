// Remote dispatch: every inspector operation runs on the node that owns the
// resources, behind one Transport boundary with two outcomes (response or
// transport failure). No retries; a failed call is reported to the caller as-is.

mod http;
mod local;
mod rpc;

pub use http::HttpTransport;
pub use local::LocalTransport;
pub use rpc::{Request, Response, execute};

use std::future::Future;

use crate::models::{
    Attributes, ResourceHandle, Snapshot, SnapshotQuery, SystemInfoRecord, UsageRecord,
};

/// The call could not be carried out on the target node. Distinct from a lookup
/// that ran and found nothing (`Ok(None)`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("node {node} unreachable: {reason}")]
    Unreachable { node: String, reason: String },
    #[error("call to node {node} timed out")]
    Timeout { node: String },
    #[error("node {node} rejected arguments: {reason}")]
    BadArguments { node: String, reason: String },
    #[error("node {node} failed: {reason}")]
    Remote { node: String, reason: String },
    #[error("unexpected reply from node {node}: {reason}")]
    Protocol { node: String, reason: String },
}

/// Point-to-point call executing `request` on `node`.
pub trait Transport: Send + Sync {
    fn call(
        &self,
        node: &str,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

/// Caller-side facade: one method per operation, each routed to the owning node.
/// Single-resource lookups take the node from the handle.
pub struct Inspector<T> {
    transport: T,
}

fn unexpected(node: &str, op: &str, response: &Response) -> TransportError {
    let kind = match response {
        Response::Snapshot(_) => "snapshot",
        Response::Info(_) => "info",
        Response::SystemInfo(_) => "system_info",
        Response::Usage(_) => "usage",
    };
    TransportError::Protocol {
        node: node.to_string(),
        reason: format!("{} answered with {}", op, kind),
    }
}

impl<T: Transport> Inspector<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn snapshot(&self, node: &str, request: Request) -> Result<Snapshot, TransportError> {
        let op = request.operation();
        match self.transport.call(node, request).await? {
            Response::Snapshot(s) => Ok(s),
            other => Err(unexpected(node, op, &other)),
        }
    }

    async fn info(&self, node: &str, request: Request) -> Result<Option<Attributes>, TransportError> {
        let op = request.operation();
        match self.transport.call(node, request).await? {
            Response::Info(info) => Ok(info),
            other => Err(unexpected(node, op, &other)),
        }
    }

    pub async fn fetch_processes(&self, node: &str, query: SnapshotQuery) -> Result<Snapshot, TransportError> {
        self.snapshot(node, Request::FetchProcesses { query }).await
    }

    pub async fn fetch_ports(&self, node: &str, query: SnapshotQuery) -> Result<Snapshot, TransportError> {
        self.snapshot(node, Request::FetchPorts { query }).await
    }

    pub async fn fetch_tables(&self, node: &str, query: SnapshotQuery) -> Result<Snapshot, TransportError> {
        self.snapshot(node, Request::FetchTables { query }).await
    }

    pub async fn fetch_sockets(&self, node: &str, query: SnapshotQuery) -> Result<Snapshot, TransportError> {
        self.snapshot(node, Request::FetchSockets { query }).await
    }

    pub async fn fetch_process_info(
        &self,
        handle: &ResourceHandle,
        fields: &[&str],
    ) -> Result<Option<Attributes>, TransportError> {
        let request = Request::FetchProcessInfo {
            handle: handle.clone(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        self.info(&handle.node, request).await
    }

    pub async fn fetch_port_info(
        &self,
        handle: &ResourceHandle,
        fields: &[&str],
    ) -> Result<Option<Attributes>, TransportError> {
        let request = Request::FetchPortInfo {
            handle: handle.clone(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        self.info(&handle.node, request).await
    }

    pub async fn fetch_table_info(
        &self,
        node: &str,
        handle: &ResourceHandle,
    ) -> Result<Option<Attributes>, TransportError> {
        let request = Request::FetchTableInfo {
            handle: handle.clone(),
        };
        self.info(node, request).await
    }

    pub async fn fetch_socket_info(
        &self,
        handle: &ResourceHandle,
        fields: &[&str],
    ) -> Result<Option<Attributes>, TransportError> {
        let request = Request::FetchSocketInfo {
            handle: handle.clone(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        self.info(&handle.node, request).await
    }

    pub async fn fetch_system_info(&self, node: &str) -> Result<SystemInfoRecord, TransportError> {
        match self.transport.call(node, Request::FetchSystemInfo).await? {
            Response::SystemInfo(info) => Ok(info),
            other => Err(unexpected(node, "fetch_system_info", &other)),
        }
    }

    pub async fn fetch_system_usage(&self, node: &str) -> Result<UsageRecord, TransportError> {
        match self.transport.call(node, Request::FetchSystemUsage).await? {
            Response::Usage(usage) => Ok(usage),
            other => Err(unexpected(node, "fetch_system_usage", &other)),
        }
    }
}
