//! The versioned document content contract.
//!
//! This is the shape written back to the document record when generation
//! completes and the shape re-rendering reads later. Field removals or
//! renames here are breaking changes for stored documents.

use crate::MediaSource;
use serde::{Deserialize, Serialize};

/// Fully generated document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    /// Document title
    pub title: String,
    /// Optional subtitle
    pub subtitle: Option<String>,
    /// Executive summary prose
    pub executive_summary: String,
    /// Ordered body sections
    pub sections: Vec<Section>,
    /// Closing section
    pub conclusion: Conclusion,
    /// Statistics extracted from the document and research
    pub statistics: Vec<Statistic>,
    /// Rendered charts
    pub charts: Vec<Chart>,
}

impl DocumentContent {
    /// Total word count across summary, sections, subsections and conclusion.
    pub fn word_count(&self) -> usize {
        let mut count = self.executive_summary.split_whitespace().count();
        for section in &self.sections {
            count += section.content.split_whitespace().count();
            for subsection in &section.subsections {
                count += subsection.content.split_whitespace().count();
            }
        }
        count += self.conclusion.content.split_whitespace().count();
        count
    }

    /// Number of statistics carried by the document.
    pub fn statistics_count(&self) -> usize {
        self.statistics.len()
    }
}

/// A top-level document section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable section identifier from the outline
    pub id: String,
    /// Section heading
    pub title: String,
    /// Section prose; empty when content lives in subsections
    pub content: String,
    /// Ordered subsections, possibly empty
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

/// A second-level document section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    /// Stable subsection identifier from the outline
    pub id: String,
    /// Subsection heading
    pub title: String,
    /// Subsection prose
    pub content: String,
}

/// The closing section of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    /// Conclusion prose
    pub content: String,
    /// Closing call to action
    pub call_to_action: String,
}

/// A quantitative claim extracted from generated content or research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Raw value string, may include %, $, or magnitude suffixes
    pub value: String,
    /// Sentence or phrase giving the value meaning
    pub context: String,
    /// Attribution, when known
    #[serde(default)]
    pub source: Option<String>,
    /// Grouping category used by visualization suggestion
    #[serde(default)]
    pub category: Option<String>,
    /// Whether this statistic deserves a prominent callout
    #[serde(default)]
    pub highlight_worthy: bool,
    /// Visualization hint (e.g. "percentage", "comparison", "trend")
    #[serde(default)]
    pub visualization_type: Option<String>,
}

/// Supported chart shapes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartType {
    /// Vertical bars
    Bar,
    /// Horizontal bars
    HorizontalBar,
    /// Connected line over points
    Line,
    /// Pie slices
    Pie,
    /// Pie with a hollow center
    Donut,
}

impl ChartType {
    /// Parse a hint string, defaulting to `Bar` for unrecognized input.
    pub fn parse_lenient(hint: &str) -> Self {
        hint.parse().unwrap_or(ChartType::Bar)
    }
}

/// A rendered chart carried inside document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// The chart shape
    pub chart_type: ChartType,
    /// Chart title
    pub title: String,
    /// Rendered raster bytes, stored base64 in serialized content
    pub image: MediaSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_parse_lenient() {
        assert_eq!(ChartType::parse_lenient("pie"), ChartType::Pie);
        assert_eq!(ChartType::parse_lenient("horizontal_bar"), ChartType::HorizontalBar);
        assert_eq!(ChartType::parse_lenient("sparkline"), ChartType::Bar);
    }

    #[test]
    fn test_word_count_spans_all_parts() {
        let content = DocumentContent {
            title: "T".to_string(),
            subtitle: None,
            executive_summary: "one two three".to_string(),
            sections: vec![Section {
                id: "s1".to_string(),
                title: "S".to_string(),
                content: "four five".to_string(),
                subsections: vec![Subsection {
                    id: "s1-1".to_string(),
                    title: "Sub".to_string(),
                    content: "six".to_string(),
                }],
            }],
            conclusion: Conclusion {
                content: "seven eight".to_string(),
                call_to_action: "act".to_string(),
            },
            statistics: vec![],
            charts: vec![],
        };
        assert_eq!(content.word_count(), 8);
    }
}
