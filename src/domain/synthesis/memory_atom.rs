//! Memory atoms - durable semantic records of high-quality syntheses.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::foundation::Timestamp;

use super::SynthesisSession;

/// Minimum clamped quality score for a finalized synthesis to be remembered.
pub const MEMORY_ATOM_QUALITY_THRESHOLD: f64 = 0.7;

const ATOM_TAGS: &[&str] = &["synthesis", "toroidal-grammar", "darkface"];
const ATOM_ACTOR: &str = "DarkFace Synthesizer";
const ATOM_SOURCE: &str = "synthesis_session";

/// A typed edge from an atom to the record it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomLink {
    pub relation: String,
    pub target: String,
}

/// A semantic memory record emitted to the external memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryAtom {
    pub id: String,
    #[serde(rename = "type")]
    pub atom_type: String,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub source: String,
    pub created_at: Timestamp,
    pub content: String,
    pub content_hash: String,
    pub links: Vec<AtomLink>,
}

impl MemoryAtom {
    /// Builds the atom for a finalized synthesis.
    ///
    /// The id depends only on the synthesis id, so re-emitting overwrites
    /// rather than duplicates.
    pub fn from_synthesis(session: &SynthesisSession, now: Timestamp) -> Self {
        let content = session.summary().unwrap_or_default().to_string();
        Self {
            id: Self::id_for(session),
            atom_type: "semantic".to_string(),
            tags: ATOM_TAGS.iter().map(|t| t.to_string()).collect(),
            actors: vec![ATOM_ACTOR.to_string()],
            source: ATOM_SOURCE.to_string(),
            created_at: now,
            content_hash: content_hash(&content),
            content,
            links: vec![AtomLink {
                relation: "derives-from".to_string(),
                target: format!("exploration/{}", session.exploration_id()),
            }],
        }
    }

    pub fn id_for(session: &SynthesisSession) -> String {
        format!("semantic/synthesis_{}", session.id())
    }
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
