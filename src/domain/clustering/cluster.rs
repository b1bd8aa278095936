//! Cluster value type produced by a clustering pass.

use serde::{Deserialize, Serialize};

use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::{ClusterId, NodeId};

/// What a cluster was seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClusterSeed {
    Tag(String),
    Node(NodeId),
    /// No node carried a tag, so there was nothing to seed from.
    Unseeded,
}

/// A group of exploration nodes (copies) with a seed and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
    pub seed: ClusterSeed,
    pub nodes: Vec<ExplorationNode>,
    pub node_count: usize,
}

impl Cluster {
    pub fn new(
        id: ClusterId,
        name: impl Into<String>,
        seed: ClusterSeed,
        nodes: Vec<ExplorationNode>,
    ) -> Self {
        let node_count = nodes.len();
        Self {
            id,
            name: name.into(),
            seed,
            nodes,
            node_count,
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// Seed tag, if this cluster was seeded by one.
    pub fn seed_tag(&self) -> Option<&str> {
        match &self.seed {
            ClusterSeed::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_serializes_with_kind_tag() {
        let json = serde_json::to_value(ClusterSeed::Tag("memory".into())).unwrap();
        assert_eq!(json["kind"], "tag");
        assert_eq!(json["value"], "memory");

        let json = serde_json::to_value(ClusterSeed::Node(NodeId::new(2))).unwrap();
        assert_eq!(json["value"], "node_2");

        let json = serde_json::to_value(ClusterSeed::Unseeded).unwrap();
        assert_eq!(json["kind"], "unseeded");
    }

    #[test]
    fn new_sets_node_count() {
        let cluster = Cluster::new(ClusterId::new(1), "Cluster: a", ClusterSeed::Unseeded, vec![]);
        assert_eq!(cluster.node_count, 0);
        assert_eq!(cluster.seed_tag(), None);
    }
}
