//! Tag-similarity clustering.
//!
//! Seeds each cluster with a tag drawn from the distinct tags of the input.
//! A node belongs with the clusters whose seed tag it carries; when several
//! clusters qualify, or none do, the tie-break policy decides.

use std::collections::BTreeSet;

use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::ClusterId;

use super::{Cluster, ClusterSeed, TieBreaker};

/// Partitions `nodes` into exactly `k` non-empty clusters.
///
/// Callers guarantee `1 <= k <= nodes.len()`.
pub fn cluster_by_tags(
    nodes: &[ExplorationNode],
    k: usize,
    tie_breaker: &dyn TieBreaker,
) -> Vec<Cluster> {
    let seeds = choose_seeds(nodes, k, tie_breaker);

    let mut groups: Vec<Vec<ExplorationNode>> = vec![Vec::new(); k];
    for node in nodes {
        let scores: Vec<u32> = seeds
            .iter()
            .map(|seed| match seed {
                ClusterSeed::Tag(tag) if node.has_tag(tag) => 1,
                _ => 0,
            })
            .collect();
        let best = scores.iter().copied().max().unwrap_or(0);
        let candidates: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|(_, score)| **score == best)
            .map(|(i, _)| i)
            .collect();
        let target = candidates[tie_breaker.choose(candidates.len())];
        groups[target].push(node.clone());
    }

    fill_empty_groups(&mut groups, tie_breaker);

    seeds
        .into_iter()
        .zip(groups)
        .enumerate()
        .map(|(i, (seed, members))| {
            let name = match &seed {
                ClusterSeed::Tag(tag) => format!("Cluster: {}", tag),
                _ => format!("Cluster {}", i + 1),
            };
            Cluster::new(ClusterId::new(i as u32 + 1), name, seed, members)
        })
        .collect()
}

/// Samples `k` distinct tags when enough exist, otherwise uses every tag and
/// pads with repeats.
fn choose_seeds(nodes: &[ExplorationNode], k: usize, tie_breaker: &dyn TieBreaker) -> Vec<ClusterSeed> {
    let all_tags: Vec<String> = nodes
        .iter()
        .flat_map(|n| n.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if all_tags.is_empty() {
        return vec![ClusterSeed::Unseeded; k];
    }

    let mut seeds: Vec<String> = if all_tags.len() >= k {
        tie_breaker
            .sample(all_tags.len(), k)
            .into_iter()
            .map(|i| all_tags[i].clone())
            .collect()
    } else {
        all_tags.clone()
    };
    while seeds.len() < k {
        seeds.push(all_tags[tie_breaker.choose(all_tags.len())].clone());
    }

    seeds.into_iter().map(ClusterSeed::Tag).collect()
}

/// Moves one node into every empty group from a group that can spare one.
///
/// With at least as many nodes as groups a donor always exists.
fn fill_empty_groups(groups: &mut [Vec<ExplorationNode>], tie_breaker: &dyn TieBreaker) {
    for empty in 0..groups.len() {
        if !groups[empty].is_empty() {
            continue;
        }
        let donors: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.len() > 1)
            .map(|(i, _)| i)
            .collect();
        if donors.is_empty() {
            break;
        }
        let donor = donors[tie_breaker.choose(donors.len())];
        let moved = groups[donor].remove(tie_breaker.choose(groups[donor].len()));
        tracing::debug!(node_id = %moved.id, "Reassigned node into empty cluster");
        groups[empty].push(moved);
    }
}
