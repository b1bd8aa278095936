//! Exploration nodes and the branch edges that mirror their parent links.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{NodeId, Timestamp};

/// A unit of exploratory content inside an exploration session.
///
/// Root nodes have no parent; a non-root node's parent always exists in the
/// same session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationNode {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    pub created_at: Timestamp,
}

impl ExplorationNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A parent to child edge, one per non-root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub from: NodeId,
    pub to: NodeId,
    pub created_at: Timestamp,
}
