//! Synthesis nodes and evaluation criteria.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClusterId, NodeId, SynthesisNodeId, Timestamp};

/// An integrative piece of content authored during synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisNode {
    pub id: SynthesisNodeId,
    pub title: String,
    pub content: String,
    /// Not validated against the current clusters; clusters are recomputed
    /// on every clustering pass while nodes are append-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<ClusterId>,
    #[serde(default)]
    pub source_node_ids: Vec<NodeId>,
    pub created_at: Timestamp,
}

impl SynthesisNode {
    /// True for nodes that integrate across clusters rather than within one.
    pub fn is_overall(&self) -> bool {
        self.cluster_id.is_none()
    }
}

/// A named yardstick a synthesis is judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Criterion {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            weight: None,
        }
    }
}
