// In-process transport: requests run against registered runtimes on the blocking
// pool. Nodes can be marked down to simulate an outage.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{instrument, warn};

use super::{Request, Response, Transport, TransportError, execute};
use crate::runtime::NodeRuntime;

pub struct LocalTransport {
    nodes: RwLock<HashMap<String, Arc<dyn NodeRuntime>>>,
    down: RwLock<HashSet<String>>,
    timeout: Duration,
}

impl LocalTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            down: RwLock::new(HashSet::new()),
            timeout,
        }
    }

    /// Make `runtime` reachable under its node name.
    pub fn register(&self, runtime: Arc<dyn NodeRuntime>) {
        let name = runtime.node_name().to_string();
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, runtime);
    }

    pub fn set_down(&self, node: &str, down: bool) {
        let mut set = self.down.write().unwrap_or_else(PoisonError::into_inner);
        if down {
            set.insert(node.to_string());
        } else {
            set.remove(node);
        }
    }

    fn resolve(&self, node: &str) -> Result<Arc<dyn NodeRuntime>, TransportError> {
        let is_down = self
            .down
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(node);
        let runtime = self
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node)
            .cloned();
        match runtime {
            Some(rt) if !is_down => Ok(rt),
            Some(_) => Err(TransportError::Unreachable {
                node: node.to_string(),
                reason: "node is down".into(),
            }),
            None => Err(TransportError::Unreachable {
                node: node.to_string(),
                reason: "unknown node".into(),
            }),
        }
    }
}

impl Transport for LocalTransport {
    #[instrument(skip(self, request), fields(transport = "local", operation = request.operation()))]
    async fn call(&self, node: &str, request: Request) -> Result<Response, TransportError> {
        let runtime = self.resolve(node)?;
        let task = tokio::task::spawn_blocking(move || execute(runtime.as_ref(), request));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(e))) => Err(TransportError::BadArguments {
                node: node.to_string(),
                reason: e.to_string(),
            }),
            Ok(Err(e)) => {
                warn!(node, error = %e, "local call panicked");
                Err(TransportError::Remote {
                    node: node.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                warn!(node, "local call timed out");
                Err(TransportError::Timeout {
                    node: node.to_string(),
                })
            }
        }
    }
}
