// Node-scoped resource handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of resource a handle points at. Sockets are ports and share the port kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Process,
    Port,
    Table,
}

/// Weak, node-scoped reference to a live resource. Holding one keeps nothing alive;
/// the owning node may drop the resource at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub node: String,
    pub kind: ResourceKind,
    pub id: u64,
}

impl ResourceHandle {
    pub fn process(node: impl Into<String>, id: u64) -> Self {
        Self {
            node: node.into(),
            kind: ResourceKind::Process,
            id,
        }
    }

    pub fn port(node: impl Into<String>, id: u64) -> Self {
        Self {
            node: node.into(),
            kind: ResourceKind::Port,
            id,
        }
    }

    pub fn table(node: impl Into<String>, id: u64) -> Self {
        Self {
            node: node.into(),
            kind: ResourceKind::Table,
            id,
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            ResourceKind::Process => "PID",
            ResourceKind::Port => "Port",
            ResourceKind::Table => "Table",
        };
        write!(f, "#{}<{}.{}>", tag, self.node, self.id)
    }
}
