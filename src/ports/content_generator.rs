//! Content Generator Port - Interface for producing exploration and
//! synthesis text.
//!
//! The governance core never writes prose itself. Topics, node content,
//! tags, cluster syntheses and quality assessments all come from an
//! implementation of this port, which may be a template engine, a language
//! model, or a human-in-the-loop queue.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::clustering::Cluster;
use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::GovernanceError;
use crate::domain::synthesis::SynthesisSession;

/// Errors a content generator can report
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Content generator unavailable: {0}")]
    Unavailable(String),

    #[error("Generated content rejected: {0}")]
    Rejected(String),
}

impl From<GenerationError> for GovernanceError {
    fn from(err: GenerationError) -> Self {
        GovernanceError::ContentGeneration(err.to_string())
    }
}

/// A titled block of generated synthesis text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisDraft {
    pub title: String,
    pub content: String,
}

/// Port for generating exploration and synthesis content
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce `count` topics related to `topic`
    async fn related_topics(&self, topic: &str, count: usize)
        -> Result<Vec<String>, GenerationError>;

    /// Produce body text for a node about `topic`, optionally continuing from
    /// its parent
    async fn generate_content(
        &self,
        topic: &str,
        parent: Option<&ExplorationNode>,
    ) -> Result<String, GenerationError>;

    /// Produce tags for a node about `topic`
    async fn generate_tags(&self, topic: &str) -> Result<BTreeSet<String>, GenerationError>;

    /// Produce a synthesis of the nodes in one cluster
    async fn synthesize_cluster(
        &self,
        position: usize,
        cluster: &Cluster,
    ) -> Result<SynthesisDraft, GenerationError>;

    /// Produce the overall synthesis across every cluster of a session
    async fn synthesize_overall(
        &self,
        session: &SynthesisSession,
    ) -> Result<SynthesisDraft, GenerationError>;

    /// Produce the closing summary of a session
    async fn summarize(&self, session: &SynthesisSession) -> Result<String, GenerationError>;

    /// Judge a session's quality on a 0.0-1.0 scale
    async fn assess_quality(&self, session: &SynthesisSession) -> Result<f64, GenerationError>;
}
