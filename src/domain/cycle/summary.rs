//! Cycle summary generation.
//!
//! Pure aggregation over a cycle's phase results, rendered as a fixed
//! Markdown narrative.

use std::fmt;

use crate::domain::foundation::Timestamp;

use super::{Cycle, PhaseType};

/// Verbal rating of an average synthesis quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    Excellent,
    VeryHigh,
    High,
    Good,
    Moderate,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            QualityBand::Excellent
        } else if score >= 0.8 {
            QualityBand::VeryHigh
        } else if score >= 0.7 {
            QualityBand::High
        } else if score >= 0.6 {
            QualityBand::Good
        } else {
            QualityBand::Moderate
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityBand::Excellent => "excellent",
            QualityBand::VeryHigh => "very high",
            QualityBand::High => "high",
            QualityBand::Good => "good",
            QualityBand::Moderate => "moderate",
        };
        write!(f, "{}", s)
    }
}

/// Aggregates feeding the cycle narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub name: String,
    pub topics: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub exploration_nodes: usize,
    pub exploration_branches: usize,
    pub synthesis_clusters: usize,
    pub synthesis_nodes: usize,
    /// Mean darkface quality score, zero when no darkface phase ran.
    pub average_quality: f64,
}

impl CycleReport {
    /// Aggregates `cycle`. `completed_at` stands in for the end date of a
    /// cycle that is being completed right now.
    pub fn from_cycle(cycle: &Cycle, completed_at: Timestamp) -> Self {
        let lightface = cycle
            .phases()
            .iter()
            .filter(|p| p.phase_type() == PhaseType::Lightface);
        let darkface: Vec<_> = cycle
            .phases()
            .iter()
            .filter(|p| p.phase_type() == PhaseType::Darkface)
            .collect();

        let mut report = Self {
            name: cycle.name().to_string(),
            topics: Vec::new(),
            start_date: cycle.start_time().date_string(),
            end_date: cycle.completion_time().unwrap_or(completed_at).date_string(),
            exploration_nodes: 0,
            exploration_branches: 0,
            synthesis_clusters: 0,
            synthesis_nodes: 0,
            average_quality: 0.0,
        };

        for phase in lightface {
            if let Some(topic) = phase.topic() {
                report.topics.push(topic.to_string());
            }
            if let Some(results) = phase.exploration_results() {
                report.exploration_nodes += results.nodes_created;
                report.exploration_branches += results.branches_created;
            }
        }

        let mut quality_total = 0.0;
        for phase in &darkface {
            if let Some(results) = phase.synthesis_results() {
                report.synthesis_clusters += results.clusters_created;
                report.synthesis_nodes += results.nodes_created;
                quality_total += results.quality_score;
            }
        }
        if !darkface.is_empty() {
            report.average_quality = quality_total / darkface.len() as f64;
        }

        report
    }

    pub fn quality_band(&self) -> QualityBand {
        QualityBand::from_score(self.average_quality)
    }

    /// The first explored topic, the subject the narrative is about.
    pub fn main_topic(&self) -> &str {
        self.topics.first().map(String::as_str).unwrap_or("the domain")
    }

    pub fn render(&self) -> String {
        let topics = if self.topics.is_empty() {
            "various domains".to_string()
        } else {
            self.topics.join(", ")
        };
        let main_topic = self.main_topic();

        format!(
            "# Toroidal Cycle: {name}

## Overview
This cycle explored {topics} through a structured process of exploration (LightFace) and synthesis (DarkFace). The cycle ran from {start} to {end}.

## Exploration Phase
The LightFace exploration phase generated {nodes} nodes across {branches} branches, exploring various aspects of {main_topic}.

## Synthesis Phase
The DarkFace synthesis phase distilled the exploration into {clusters} main clusters, generating {synthesis_nodes} synthesis nodes. The synthesis achieved a quality score of {quality:.2}, indicating a {band} level of coherence and insight.

## Outcomes
1. A coherent framework for understanding {main_topic}
2. New connections between previously separate concepts
3. Identification of promising research directions

## Next Steps
- Deeper exploration of the most promising themes
- Practical testing of the synthesized framework
- Initiation of a new cycle focusing on emergent questions
",
            name = self.name,
            topics = topics,
            start = self.start_date,
            end = self.end_date,
            nodes = self.exploration_nodes,
            branches = self.exploration_branches,
            main_topic = main_topic,
            clusters = self.synthesis_clusters,
            synthesis_nodes = self.synthesis_nodes,
            quality = self.average_quality,
            band = self.quality_band(),
        )
    }
}

/// Renders the narrative summary for `cycle`.
pub fn generate_summary(cycle: &Cycle, completed_at: Timestamp) -> String {
    CycleReport::from_cycle(cycle, completed_at).render()
}
