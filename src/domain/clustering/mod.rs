//! Clustering module - groups exploration nodes for synthesis.
//!
//! Both strategies return a true partition of their input: every node lands
//! in exactly one cluster and no cluster is empty. Choices between equally
//! good candidates go through an injected [`TieBreaker`].

mod cluster;
mod content_similarity;
mod method;
mod tag_similarity;
mod tie_break;

pub use cluster::{Cluster, ClusterSeed};
pub use content_similarity::{jaccard_similarity, tokenize};
pub use method::ClusteringMethod;
pub use tie_break::{RandomTieBreaker, RoundRobinTieBreaker, TieBreaker};
