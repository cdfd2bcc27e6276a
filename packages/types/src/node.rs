use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A key-value or directory entry in the etcd keyspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Remaining time-to-live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    #[serde(default)]
    pub dir: bool,

    #[serde(default)]
    pub created_index: u64,

    #[serde(default)]
    pub modified_index: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,

    /// Directory contents, only present on directory nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
}

impl Node {
    /// Direct children of a directory node. Empty for value nodes.
    pub fn children(&self) -> &[Node] {
        self.nodes.as_deref().unwrap_or_default()
    }

    /// Last path component of the key.
    pub fn name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or_default()
    }
}

/// Successful answer to a keyspace operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// `get`, `set`, `create`, `update`, `delete`, `compareAndSwap`, ...
    pub action: String,

    pub node: Node,

    /// Snapshot of the node before the operation, if etcd reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_node: Option<Node>,
}
