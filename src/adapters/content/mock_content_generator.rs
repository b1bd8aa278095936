//! Mock content generator for testing.
//!
//! Returns predictable text, a configurable quality score, and can be told to
//! fail so tests can exercise error propagation.
//!
//! # Example
//!
//! ```ignore
//! let generator = MockContentGenerator::new().with_quality(0.65);
//! let score = generator.assess_quality(&session).await?;
//! assert_eq!(score, 0.65);
//! ```

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::domain::clustering::Cluster;
use crate::domain::exploration::ExplorationNode;
use crate::domain::synthesis::SynthesisSession;
use crate::ports::{ContentGenerator, GenerationError, SynthesisDraft};

/// Mock generator with deterministic output.
#[derive(Debug, Clone)]
pub struct MockContentGenerator {
    quality: f64,
    tags: BTreeSet<String>,
    failure: Option<String>,
    /// Names of the port methods called, in order.
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockContentGenerator {
    pub fn new() -> Self {
        Self {
            quality: 0.85,
            tags: ["alpha", "beta"].iter().map(|t| t.to_string()).collect(),
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Quality score returned by `assess_quality`.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Tags returned by `generate_tags`.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Makes every call fail with `GenerationError::Unavailable`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &'static str) -> Result<(), GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(message) => Err(GenerationError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockContentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for MockContentGenerator {
    async fn related_topics(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerationError> {
        self.record("related_topics")?;
        Ok((1..=count).map(|i| format!("{} aspect {}", topic, i)).collect())
    }

    async fn generate_content(
        &self,
        topic: &str,
        parent: Option<&ExplorationNode>,
    ) -> Result<String, GenerationError> {
        self.record("generate_content")?;
        Ok(match parent {
            Some(parent) => format!("About {} (from {})", topic, parent.id),
            None => format!("About {}", topic),
        })
    }

    async fn generate_tags(&self, _topic: &str) -> Result<BTreeSet<String>, GenerationError> {
        self.record("generate_tags")?;
        Ok(self.tags.clone())
    }

    async fn synthesize_cluster(
        &self,
        position: usize,
        cluster: &Cluster,
    ) -> Result<SynthesisDraft, GenerationError> {
        self.record("synthesize_cluster")?;
        Ok(SynthesisDraft {
            title: format!("Synthesis of cluster {}: {}", position + 1, cluster.name),
            content: format!("{} nodes", cluster.node_count),
        })
    }

    async fn synthesize_overall(
        &self,
        session: &SynthesisSession,
    ) -> Result<SynthesisDraft, GenerationError> {
        self.record("synthesize_overall")?;
        Ok(SynthesisDraft {
            title: "Overall synthesis".to_string(),
            content: format!("{} clusters", session.clusters().len()),
        })
    }

    async fn summarize(&self, session: &SynthesisSession) -> Result<String, GenerationError> {
        self.record("summarize")?;
        Ok(format!("Summary of {}", session.exploration_topic()))
    }

    async fn assess_quality(&self, _session: &SynthesisSession) -> Result<f64, GenerationError> {
        self.record("assess_quality")?;
        Ok(self.quality)
    }
}
