//! Outline structures produced by the outline stage.
//!
//! Outlines are ephemeral: embedded into the job's stage log for diagnostics
//! and discarded after content generation. They are never persisted on their
//! own.

use serde::{Deserialize, Serialize};

/// A hierarchical section plan with word-count budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,
    /// Optional subtitle
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Executive summary plan
    pub executive_summary: ExecutiveSummarySpec,
    /// Ordered top-level sections
    pub sections: Vec<OutlineSection>,
    /// Conclusion plan
    pub conclusion: ConclusionSpec,
    /// Raw model text preserved when outline parsing fell back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Plan for the executive summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummarySpec {
    /// Points the summary must cover
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Word-count target
    #[serde(default = "default_summary_words")]
    pub word_count: u32,
}

/// Plan for one top-level section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    /// Stable section identifier; filled in after parsing when the model omits it
    #[serde(default)]
    pub id: String,
    /// Section heading
    pub title: String,
    /// What the section is meant to accomplish
    #[serde(default)]
    pub purpose: String,
    /// Word-count target
    #[serde(default = "default_section_words")]
    pub word_count: u32,
    /// Ordered subsections, possibly empty
    #[serde(default)]
    pub subsections: Vec<OutlineSubsection>,
}

/// Plan for one subsection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSubsection {
    /// Stable subsection identifier; filled in after parsing when the model omits it
    #[serde(default)]
    pub id: String,
    /// Subsection heading
    pub title: String,
    /// Points the subsection must cover
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Word-count target
    #[serde(default = "default_subsection_words")]
    pub word_count: u32,
    /// Whether statistics should be woven into the prose
    #[serde(default)]
    pub include_statistics: bool,
    /// Whether a chart placement is suggested here
    #[serde(default)]
    pub include_chart: bool,
}

/// Plan for the conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclusionSpec {
    /// Points the conclusion must cover
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Word-count target
    #[serde(default = "default_conclusion_words")]
    pub word_count: u32,
}

impl Default for ExecutiveSummarySpec {
    fn default() -> Self {
        Self {
            key_points: Vec::new(),
            word_count: default_summary_words(),
        }
    }
}

impl Default for ConclusionSpec {
    fn default() -> Self {
        Self {
            key_points: Vec::new(),
            word_count: default_conclusion_words(),
        }
    }
}

fn default_summary_words() -> u32 {
    250
}

fn default_section_words() -> u32 {
    400
}

fn default_subsection_words() -> u32 {
    200
}

fn default_conclusion_words() -> u32 {
    300
}
