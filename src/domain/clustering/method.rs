//! Clustering method selection and the shared entry point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::{GovernanceError, ValidationError};

use super::content_similarity::cluster_by_content;
use super::tag_similarity::cluster_by_tags;
use super::{Cluster, TieBreaker};

/// Strategy used to group exploration nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringMethod {
    TagSimilarity,
    ContentSimilarity,
}

impl ClusteringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringMethod::TagSimilarity => "tag_similarity",
            ClusteringMethod::ContentSimilarity => "content_similarity",
        }
    }

    /// Partitions `nodes` into `k` non-empty clusters.
    ///
    /// A partition cannot hold more non-empty clusters than there are nodes,
    /// so `k` is lowered to `nodes.len()` when it exceeds it. An empty input
    /// yields no clusters.
    ///
    /// # Errors
    ///
    /// - `Validation` if `k` is zero
    pub fn cluster(
        &self,
        nodes: &[ExplorationNode],
        k: usize,
        tie_breaker: &dyn TieBreaker,
    ) -> Result<Vec<Cluster>, GovernanceError> {
        if k == 0 {
            return Err(ValidationError::out_of_range("k", 1, i64::MAX, 0).into());
        }
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let effective_k = if k > nodes.len() {
            tracing::warn!(
                requested = k,
                nodes = nodes.len(),
                "Fewer nodes than requested clusters, lowering cluster count"
            );
            nodes.len()
        } else {
            k
        };

        let clusters = match self {
            ClusteringMethod::TagSimilarity => cluster_by_tags(nodes, effective_k, tie_breaker),
            ClusteringMethod::ContentSimilarity => {
                cluster_by_content(nodes, effective_k, tie_breaker)
            }
        };
        tracing::debug!(
            method = %self,
            clusters = clusters.len(),
            nodes = nodes.len(),
            "Clustered exploration nodes"
        );
        Ok(clusters)
    }
}

impl fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClusteringMethod {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag_similarity" => Ok(ClusteringMethod::TagSimilarity),
            "content_similarity" => Ok(ClusteringMethod::ContentSimilarity),
            other => Err(GovernanceError::UnknownMethod(other.to_string())),
        }
    }
}
