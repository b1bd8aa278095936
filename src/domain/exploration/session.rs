//! Exploration session aggregate - the LightFace phase's growing node forest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{
    ExplorationId, GovernanceError, NodeId, SessionStatus, StateMachine, Timestamp,
    ValidationError,
};

use super::{Branch, ExplorationNode};

/// Longest exploration window accepted, in days.
pub const MAX_DURATION_DAYS: u32 = 365;

/// Counters derived from an exploration, recorded on the cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationResults {
    pub nodes_created: usize,
    pub branches_created: usize,
    pub unique_tags: usize,
}

/// An open-ended, time-boxed exploration bound to one topic.
///
/// # Invariants
///
/// - `end_time = start_time + duration_days`
/// - every non-root node's parent exists among `nodes`
/// - exactly one branch per non-root node
/// - node ids are sequential and never reused
/// - completed sessions cannot be modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSession {
    id: ExplorationId,
    topic: String,
    duration_days: u32,
    #[serde(default)]
    constraints: Vec<String>,
    start_time: Timestamp,
    end_time: Timestamp,
    status: SessionStatus,
    nodes: Vec<ExplorationNode>,
    branches: Vec<Branch>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl ExplorationSession {
    /// Starts a new active session at the current time.
    ///
    /// # Errors
    ///
    /// - `Validation` if the topic is blank or the duration is outside 1..=365 days
    pub fn start(
        topic: impl Into<String>,
        duration_days: u32,
        constraints: Vec<String>,
    ) -> Result<Self, GovernanceError> {
        Self::start_at(topic, duration_days, constraints, Timestamp::now())
    }

    /// Starts a new active session as of `now`.
    pub fn start_at(
        topic: impl Into<String>,
        duration_days: u32,
        constraints: Vec<String>,
        now: Timestamp,
    ) -> Result<Self, GovernanceError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ValidationError::empty_field("topic").into());
        }
        if duration_days == 0 || duration_days > MAX_DURATION_DAYS {
            return Err(ValidationError::out_of_range(
                "duration_days",
                1,
                i64::from(MAX_DURATION_DAYS),
                i64::from(duration_days),
            )
            .into());
        }

        Ok(Self {
            id: ExplorationId::new(),
            topic,
            duration_days,
            constraints,
            start_time: now,
            end_time: now.add_days(i64::from(duration_days)),
            status: SessionStatus::Active,
            nodes: Vec::new(),
            branches: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> ExplorationId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    /// The stored status. Use [`derive_effective_status`] when the current
    /// time matters.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn nodes(&self) -> &[ExplorationNode] {
        &self.nodes
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn node(&self, id: NodeId) -> Option<&ExplorationNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Distinct tags across every node.
    pub fn unique_tags(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect()
    }

    pub fn results(&self) -> ExplorationResults {
        ExplorationResults {
            nodes_created: self.nodes.len(),
            branches_created: self.branches.len(),
            unique_tags: self.unique_tags().len(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Applies lazy expiry. Returns true if the stored status flipped.
    pub fn refresh_status(&mut self, now: Timestamp) -> bool {
        let effective = derive_effective_status(self, now);
        if effective == self.status {
            return false;
        }
        self.status = effective;
        self.updated_at = now;
        true
    }

    /// Appends a node (and its mirrored branch when it has a parent).
    ///
    /// Expiry is applied first; callers that persist should persist even when
    /// this fails with `SessionNotActive`, since the status may have flipped.
    ///
    /// # Errors
    ///
    /// - `SessionNotActive` if the session is completed (or has just expired)
    /// - `ParentNotFound` if `parent_id` names no node in this session
    /// - `Validation` if the title is blank
    pub fn add_node(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: BTreeSet<String>,
        parent_id: Option<NodeId>,
        now: Timestamp,
    ) -> Result<ExplorationNode, GovernanceError> {
        self.refresh_status(now);
        if !self.status.is_active() {
            return Err(GovernanceError::SessionNotActive(self.id));
        }

        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }
        if let Some(parent) = parent_id {
            if self.node(parent).is_none() {
                return Err(GovernanceError::ParentNotFound {
                    exploration_id: self.id,
                    parent_id: parent,
                });
            }
        }

        let node = ExplorationNode {
            id: self.next_node_id(),
            title,
            content: content.into(),
            tags,
            parent_id,
            created_at: now,
        };
        if let Some(parent) = parent_id {
            self.branches.push(Branch {
                from: parent,
                to: node.id,
                created_at: now,
            });
        }
        self.nodes.push(node.clone());
        self.updated_at = now;
        Ok(node)
    }

    /// Completes the session regardless of its end time.
    ///
    /// Returns false when it was already completed.
    pub fn end(&mut self, now: Timestamp) -> bool {
        match self.status.transition_to(SessionStatus::Completed) {
            Ok(next) => {
                self.status = next;
                self.updated_at = now;
                true
            }
            Err(_) => false,
        }
    }

    fn next_node_id(&self) -> NodeId {
        // Nodes are never removed, so the count is the highest issued sequence.
        NodeId::new(self.nodes.len() as u32 + 1)
    }
}

/// The status a session has as of `now`, with lazy expiry applied.
pub fn derive_effective_status(session: &ExplorationSession, now: Timestamp) -> SessionStatus {
    if session.status.is_active() && now.is_after(&session.end_time) {
        SessionStatus::Completed
    } else {
        session.status
    }
}
