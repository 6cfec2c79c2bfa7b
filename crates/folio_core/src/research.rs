//! Research structures produced by the research stage.
//!
//! These are pipeline-internal: consumed by the outline and writing stages,
//! summarized into the job's stage log, and discarded after generation.

use crate::Statistic;
use serde::{Deserialize, Serialize};

/// Structured findings for a topic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchBundle {
    /// Primary findings about the topic
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Quantitative claims surfaced during research
    #[serde(default)]
    pub statistics: Vec<Statistic>,
    /// Current and emerging trends
    #[serde(default)]
    pub trends: Vec<String>,
    /// Challenges practitioners face
    #[serde(default)]
    pub challenges: Vec<String>,
    /// Opportunities worth highlighting
    #[serde(default)]
    pub opportunities: Vec<String>,
    /// Representative expert viewpoints
    #[serde(default)]
    pub expert_perspectives: Vec<String>,
    /// Sources worth citing
    #[serde(default)]
    pub recommended_sources: Vec<String>,
    /// Industry context, when an industry was analyzed
    #[serde(default)]
    pub industry_analysis: Option<IndustryAnalysis>,
}

/// Industry context for a topic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndustryAnalysis {
    /// Industry name as supplied by the caller
    pub industry: String,
    /// Broad overview prose
    #[serde(default)]
    pub overview: String,
    /// Industry-level trends
    #[serde(default)]
    pub trends: Vec<String>,
    /// Industry-level challenges
    #[serde(default)]
    pub challenges: Vec<String>,
    /// Industry-level opportunities
    #[serde(default)]
    pub opportunities: Vec<String>,
    /// Regulatory landscape notes
    #[serde(default)]
    pub regulatory_landscape: String,
    /// Competitive dynamics notes
    #[serde(default)]
    pub competitive_dynamics: String,
    /// Forward-looking outlook
    #[serde(default)]
    pub outlook: String,
}
