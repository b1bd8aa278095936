//! Content-similarity clustering.
//!
//! Seeds each cluster with a sampled node and attaches every other node to
//! the seed whose title and content share the most vocabulary with it,
//! measured as Jaccard similarity over normalized word tokens.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::ClusterId;

use super::{Cluster, ClusterSeed, TieBreaker};

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "can", "could", "for", "from", "has",
        "have", "in", "into", "is", "it", "its", "not", "of", "on", "or", "our", "that", "the",
        "these", "this", "to", "we", "when", "which", "with",
    ]
    .into_iter()
    .collect()
});

/// Lowercased word tokens of a node's title and content, stop words removed.
pub fn tokenize(node: &ExplorationNode) -> HashSet<String> {
    node.title
        .split(|c: char| !c.is_alphanumeric())
        .chain(node.content.split(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .collect()
}

/// |A ∩ B| / |A ∪ B|; zero when either side has no tokens.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Partitions `nodes` into exactly `k` non-empty clusters.
///
/// Callers guarantee `1 <= k <= nodes.len()`.
pub fn cluster_by_content(
    nodes: &[ExplorationNode],
    k: usize,
    tie_breaker: &dyn TieBreaker,
) -> Vec<Cluster> {
    let seed_indices = tie_breaker.sample(nodes.len(), k);
    let seed_tokens: Vec<HashSet<String>> =
        seed_indices.iter().map(|&i| tokenize(&nodes[i])).collect();

    let mut groups: Vec<Vec<ExplorationNode>> =
        seed_indices.iter().map(|&i| vec![nodes[i].clone()]).collect();

    for (index, node) in nodes.iter().enumerate() {
        if seed_indices.contains(&index) {
            continue;
        }
        let tokens = tokenize(node);
        let scores: Vec<f64> = seed_tokens
            .iter()
            .map(|seed| jaccard_similarity(&tokens, seed))
            .collect();
        let best = scores.iter().copied().fold(0.0_f64, f64::max);
        let candidates: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|(_, score)| **score == best)
            .map(|(i, _)| i)
            .collect();
        let target = candidates[tie_breaker.choose(candidates.len())];
        groups[target].push(node.clone());
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, members)| {
            let seed = &members[0];
            let name = format!("Theme: {}", seed.title);
            let seed = ClusterSeed::Node(seed.id);
            Cluster::new(ClusterId::new(i as u32 + 1), name, seed, members)
        })
        .collect()
}
