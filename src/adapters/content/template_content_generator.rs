//! Template-based content generator adapter.
//!
//! Produces exploration and synthesis text from fixed templates with random
//! selection. This is the default ContentGenerator and stands in wherever no
//! model-backed generator is configured.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::domain::clustering::Cluster;
use crate::domain::exploration::ExplorationNode;
use crate::domain::synthesis::SynthesisSession;
use crate::ports::{ContentGenerator, GenerationError, SynthesisDraft};

const BASE_TOPICS: &[&str] = &[
    "neural networks",
    "symbolic reasoning",
    "cognitive architecture",
    "memory systems",
    "attention mechanisms",
    "recursive processing",
    "hypergraph representations",
    "language models",
    "evolutionary algorithms",
    "probabilistic inference",
    "embodied cognition",
    "meta-learning",
];

const CONTENT_TEMPLATES: &[&str] = &[
    "The concept of {topic} represents an interesting area of exploration. It involves understanding how different components interact and influence each other.",
    "When examining {topic}, we find several key principles at work. These include structural organization, functional relationships, and emergent properties.",
    "{topic} can be understood through multiple lenses, including theoretical frameworks, practical applications, and historical development.",
    "Research into {topic} reveals patterns of complexity that span different levels of analysis, from fundamental mechanisms to higher-order phenomena.",
    "Exploring {topic} leads to questions about how knowledge is structured, represented, and transformed across different contexts.",
];

const GENERIC_TAGS: &[&str] = &[
    "exploration",
    "cognitive",
    "research",
    "theory",
    "application",
    "framework",
    "model",
    "system",
    "architecture",
    "integration",
];

const CLUSTER_TEMPLATES: &[&str] = &[
    "This cluster brings together {concepts}. Taken together they describe a shared structure that none of them shows on its own.",
    "Across {concepts}, a common pattern appears: each addresses how organization at one level shapes behavior at another.",
    "The ideas in {concepts} converge on a single question about representation and how it changes under transformation.",
    "Examining {concepts} side by side reveals complementary strengths that suggest an integrated approach.",
];

const FOCUS_AREAS: &[&str] = &[
    "theoretical foundations",
    "practical applications",
    "methodological approaches",
    "conceptual frameworks",
    "integration patterns",
    "emergent properties",
];

const MAX_TAGS: usize = 5;
const SAMPLED_GENERIC_TAGS: usize = 3;
const COMPOUND_TOPIC_PROBABILITY: f64 = 0.7;

/// Template-based implementation of ContentGenerator.
#[derive(Debug)]
pub struct TemplateContentGenerator {
    rng: Mutex<StdRng>,
    /// Inclusive-exclusive range quality assessments are drawn from.
    quality_range: (f64, f64),
}

impl TemplateContentGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates a generator whose output is reproducible for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            quality_range: (0.7, 0.95),
        }
    }

    /// Overrides the range quality assessments are drawn from.
    pub fn with_quality_range(mut self, low: f64, high: f64) -> Self {
        self.quality_range = (low.min(high), low.max(high));
        self
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    fn render_cluster(&self, cluster: &Cluster) -> String {
        let concepts = cluster
            .nodes
            .iter()
            .map(|n| n.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let template = self.with_rng(|rng| CLUSTER_TEMPLATES.choose(rng).copied().unwrap_or(""));
        template.replace("{concepts}", &concepts)
    }
}

impl Default for TemplateContentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for TemplateContentGenerator {
    async fn related_topics(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerationError> {
        Ok(self.with_rng(|rng| {
            BASE_TOPICS
                .choose_multiple(rng, count.min(BASE_TOPICS.len()))
                .map(|base| {
                    if rng.gen_bool(COMPOUND_TOPIC_PROBABILITY) {
                        format!("{} and {}", topic, base)
                    } else {
                        format!("{} for {}", base, topic)
                    }
                })
                .collect()
        }))
    }

    async fn generate_content(
        &self,
        topic: &str,
        parent: Option<&ExplorationNode>,
    ) -> Result<String, GenerationError> {
        let template = self.with_rng(|rng| CONTENT_TEMPLATES.choose(rng).copied().unwrap_or(""));
        let body = template.replace("{topic}", topic);
        Ok(match parent {
            Some(parent) => format!("Building on \"{}\": {}", parent.title, body),
            None => body,
        })
    }

    async fn generate_tags(&self, topic: &str) -> Result<BTreeSet<String>, GenerationError> {
        let mut tags: Vec<String> = topic
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .collect();
        self.with_rng(|rng| {
            tags.extend(
                GENERIC_TAGS
                    .choose_multiple(rng, SAMPLED_GENERIC_TAGS)
                    .map(|t| t.to_string()),
            )
        });

        let mut unique = BTreeSet::new();
        for tag in tags {
            if unique.len() == MAX_TAGS {
                break;
            }
            unique.insert(tag);
        }
        Ok(unique)
    }

    async fn synthesize_cluster(
        &self,
        position: usize,
        cluster: &Cluster,
    ) -> Result<SynthesisDraft, GenerationError> {
        Ok(SynthesisDraft {
            title: format!("Synthesis of cluster {}: {}", position + 1, cluster.name),
            content: self.render_cluster(cluster),
        })
    }

    async fn synthesize_overall(
        &self,
        session: &SynthesisSession,
    ) -> Result<SynthesisDraft, GenerationError> {
        let mut content = format!(
            "The exploration of {} surfaced {} distinct themes:\n\n",
            session.exploration_topic(),
            session.clusters().len()
        );
        for (i, cluster) in session.clusters().iter().enumerate() {
            let focus = self.with_rng(|rng| FOCUS_AREAS.choose(rng).copied().unwrap_or(""));
            content.push_str(&format!(
                "{}. **{}** - Represents a distinct perspective focusing on {}.\n",
                i + 1,
                cluster.name,
                focus
            ));
        }
        content.push_str(
            "\nTogether these themes form an integrated view in which each perspective \
             informs and constrains the others.",
        );

        Ok(SynthesisDraft {
            title: "Overall synthesis".to_string(),
            content,
        })
    }

    async fn summarize(&self, session: &SynthesisSession) -> Result<String, GenerationError> {
        Ok(format!(
            "This synthesis of {} identified {} main themes and integrated them into a coherent framework.",
            session.exploration_topic(),
            session.clusters().len()
        ))
    }

    async fn assess_quality(&self, _session: &SynthesisSession) -> Result<f64, GenerationError> {
        let (low, high) = self.quality_range;
        if low >= high {
            return Ok(low);
        }
        Ok(self.with_rng(|rng| rng.gen_range(low..high)))
    }
}
