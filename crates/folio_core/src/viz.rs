//! Visualization suggestions flowing from the statistics stage to the chart stage.

use crate::ChartType;
use serde::{Deserialize, Serialize};

/// What a suggestion asks the renderer to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Render a chart of the given shape
    Chart(ChartType),
    /// Display as a prominent text callout; never rendered as a chart
    Callout,
}

/// Priority assigned by the suggestion heuristics.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SuggestionPriority {
    /// Render if space allows
    Low,
    /// Default priority
    Medium,
    /// Strong candidate for rendering
    High,
}

/// A suggested visualization over a group of statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSuggestion {
    /// What to render
    pub kind: SuggestionKind,
    /// Chart or callout title
    pub title: String,
    /// Data labels, parallel to `values`
    pub labels: Vec<String>,
    /// Numeric values, parallel to `labels`
    pub values: Vec<f64>,
    /// Why this visualization was suggested
    pub description: String,
    /// Rendering priority
    pub priority: SuggestionPriority,
}

impl VisualizationSuggestion {
    /// Whether this suggestion asks for a rendered chart.
    pub fn is_chart(&self) -> bool {
        matches!(self.kind, SuggestionKind::Chart(_))
    }
}
