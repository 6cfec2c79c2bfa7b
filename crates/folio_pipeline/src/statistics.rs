//! Statistics & visualization stage.
//!
//! Extraction never leaves the pipeline empty-handed: if the model's JSON
//! fails to parse (or the call itself fails), a regex pass over the compiled
//! content pulls out percentages, currency amounts and magnitude figures,
//! supplemented with leftover research statistics.

use crate::extraction::parse_json_fragment;
use crate::prompts;
use folio_core::{
    ChartType, DocumentContent, GenerateRequest, Message, ResearchBundle, Statistic,
    SuggestionKind, SuggestionPriority, VisualizationSuggestion,
};
use folio_interface::FolioDriver;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const STATISTICS_TOKEN_BUDGET: u32 = 2000;
const CONTENT_EXCERPT_CHARS: usize = 5000;
const MAX_SUPPLEMENTED_RESEARCH_STATS: usize = 5;
const MAX_PIE_SLICES: usize = 5;

/// Extracts and classifies quantitative claims.
pub struct StatisticsStage {
    driver: Arc<dyn FolioDriver>,
}

#[derive(Deserialize)]
struct StatisticsPayload {
    #[serde(default)]
    statistics: Vec<Statistic>,
}

impl StatisticsStage {
    /// Create the stage with an injected driver.
    pub fn new(driver: Arc<dyn FolioDriver>) -> Self {
        Self { driver }
    }

    /// Extract statistics from generated content plus known research statistics.
    ///
    /// Infallible by design: any model failure (transport or parse) falls
    /// back to regex extraction so the pipeline always has something to
    /// visualize.
    #[tracing::instrument(skip(self, content, research))]
    pub async fn extract_statistics(
        &self,
        content: &DocumentContent,
        research: &ResearchBundle,
    ) -> Vec<Statistic> {
        let compiled = compile_content(content);
        let excerpt: String = compiled.chars().take(CONTENT_EXCERPT_CHARS).collect();
        let prompt = prompts::statistics_prompt(&excerpt, &research.statistics);
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(STATISTICS_TOKEN_BUDGET),
            temperature: None,
            model: None,
        };

        match self.driver.generate(&request).await {
            Ok(response) => {
                let raw = response.text();
                match parse_json_fragment::<StatisticsPayload>(&raw) {
                    Some(payload) if !payload.statistics.is_empty() => {
                        tracing::info!(count = payload.statistics.len(), "Statistics parsed");
                        payload.statistics
                    }
                    _ => {
                        tracing::warn!("Statistics response did not parse, using regex fallback");
                        fallback_statistics(&compiled, research)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Statistics call failed, using regex fallback");
                fallback_statistics(&compiled, research)
            }
        }
    }
}

/// Display shapes produced by [`format_statistic`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticDisplay {
    /// Prominent callout: big value over its context
    Callout {
        /// The value, displayed large
        primary: String,
        /// Context line
        secondary: String,
        /// Source attribution, when known
        attribution: Option<String>,
    },
    /// Single line for in-text mention
    Inline {
        /// The full line
        text: String,
    },
    /// Compact label for chart annotation
    ChartLabel {
        /// Truncated label
        label: String,
        /// Value plus context
        description: String,
    },
}

/// How a statistic should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStyle {
    /// Prominent callout box
    #[default]
    Callout,
    /// In-text mention
    Inline,
    /// Chart annotation
    ChartLabel,
}

impl DisplayStyle {
    /// Parse a style name; unknown styles fall back to `Callout`.
    pub fn parse_lenient(style: &str) -> Self {
        match style {
            "inline" => DisplayStyle::Inline,
            "chart_label" => DisplayStyle::ChartLabel,
            _ => DisplayStyle::Callout,
        }
    }
}

/// Pure formatting of a statistic for display; no I/O.
pub fn format_statistic(stat: &Statistic, style: DisplayStyle) -> StatisticDisplay {
    match style {
        DisplayStyle::Callout => StatisticDisplay::Callout {
            primary: stat.value.clone(),
            secondary: stat.context.clone(),
            attribution: stat.source.clone(),
        },
        DisplayStyle::Inline => {
            let text = match &stat.source {
                Some(source) => format!("{} {} ({})", stat.value, stat.context, source),
                None => format!("{} {}", stat.value, stat.context),
            };
            StatisticDisplay::Inline { text }
        }
        DisplayStyle::ChartLabel => StatisticDisplay::ChartLabel {
            label: truncate(&stat.context, 24),
            description: format!("{}: {}", stat.value, truncate(&stat.context, 80)),
        },
    }
}

/// Suggest visualizations for a set of statistics.
///
/// - Categories with at least 3 members and at least 2 parseable values get
///   a horizontal-bar suggestion (priority high at 4+ parsed values).
/// - Each category with a highlight-worthy statistic gets at most one
///   callout suggestion.
/// - At least 2 percentage statistics summing to <= 100 yield one pie chart
///   over up to 5 of them.
pub fn suggest_visualizations(statistics: &[Statistic]) -> Vec<VisualizationSuggestion> {
    let mut suggestions = Vec::new();

    let mut groups: BTreeMap<String, Vec<&Statistic>> = BTreeMap::new();
    for stat in statistics {
        let category = stat
            .category
            .clone()
            .unwrap_or_else(|| "general".to_string());
        groups.entry(category).or_default().push(stat);
    }

    for (category, members) in &groups {
        if members.len() < 3 {
            continue;
        }
        let parsed: Vec<(&&Statistic, f64)> = members
            .iter()
            .filter_map(|s| parse_numeric(&s.value).map(|v| (s, v)))
            .collect();
        if parsed.len() < 2 {
            continue;
        }
        let priority = if parsed.len() >= 4 {
            SuggestionPriority::High
        } else {
            SuggestionPriority::Medium
        };
        suggestions.push(VisualizationSuggestion {
            kind: SuggestionKind::Chart(ChartType::HorizontalBar),
            title: format!("{} at a glance", capitalize(category)),
            labels: parsed.iter().map(|(s, _)| truncate(&s.context, 24)).collect(),
            values: parsed.iter().map(|(_, v)| *v).collect(),
            description: format!("Comparison of {} {} figures", parsed.len(), category),
            priority,
        });
    }

    for (category, members) in &groups {
        if let Some(stat) = members.iter().find(|s| s.highlight_worthy) {
            suggestions.push(VisualizationSuggestion {
                kind: SuggestionKind::Callout,
                title: stat.value.clone(),
                labels: vec![truncate(&stat.context, 40)],
                values: vec![parse_numeric(&stat.value).unwrap_or(0.0)],
                description: stat.context.clone(),
                priority: SuggestionPriority::High,
            });
        }
    }

    let percentages: Vec<(&Statistic, f64)> = statistics
        .iter()
        .filter(|s| is_percentage(s))
        .filter_map(|s| parse_numeric(&s.value).map(|v| (s, v)))
        .take(MAX_PIE_SLICES)
        .collect();
    if percentages.len() >= 2 {
        let sum: f64 = percentages.iter().map(|(_, v)| v).sum();
        if sum <= 100.0 {
            suggestions.push(VisualizationSuggestion {
                kind: SuggestionKind::Chart(ChartType::Pie),
                title: "Share breakdown".to_string(),
                labels: percentages
                    .iter()
                    .map(|(s, _)| truncate(&s.context, 24))
                    .collect(),
                values: percentages.iter().map(|(_, v)| *v).collect(),
                description: format!("{} percentage figures summing to {:.0}%", percentages.len(), sum),
                priority: SuggestionPriority::Medium,
            });
        }
    }

    suggestions
}

/// Flatten document prose for excerpting and regex extraction.
fn compile_content(content: &DocumentContent) -> String {
    let mut compiled = String::new();
    compiled.push_str(&content.executive_summary);
    for section in &content.sections {
        compiled.push_str("\n\n");
        compiled.push_str(&section.content);
        for sub in &section.subsections {
            compiled.push_str("\n\n");
            compiled.push_str(&sub.content);
        }
    }
    compiled.push_str("\n\n");
    compiled.push_str(&content.conclusion.content);
    compiled
}

/// Regex extraction of percentages, currency amounts and magnitude figures.
fn fallback_statistics(compiled: &str, research: &ResearchBundle) -> Vec<Statistic> {
    // Anchored patterns for the three numeric shapes worth visualizing
    let patterns = [
        (r"\d+(?:\.\d+)?\s?%", "percentage"),
        (
            r"\$\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:billion|million|trillion))?",
            "currency",
        ),
        (r"\d[\d,]*(?:\.\d+)?\s?(?:billion|million|trillion)", "magnitude"),
    ];

    let mut found = Vec::new();
    let mut seen = Vec::new();
    for (pattern, viz_type) in patterns {
        let Ok(re) = Regex::new(&format!("(?i){}", pattern)) else {
            continue;
        };
        for m in re.find_iter(compiled) {
            let value = m.as_str().trim().to_string();
            if seen.contains(&value) {
                continue;
            }
            seen.push(value.clone());
            found.push(Statistic {
                value,
                context: surrounding_sentence(compiled, m.start(), m.end()),
                source: None,
                category: None,
                highlight_worthy: true,
                visualization_type: Some(viz_type.to_string()),
            });
        }
    }

    for stat in research.statistics.iter().take(MAX_SUPPLEMENTED_RESEARCH_STATS) {
        if seen.contains(&stat.value) {
            continue;
        }
        let mut stat = stat.clone();
        stat.highlight_worthy = true;
        found.push(stat);
    }

    tracing::info!(count = found.len(), "Fallback statistics extracted");
    found
}

/// The sentence (bounded by periods or newlines) around a match.
fn surrounding_sentence(text: &str, start: usize, end: usize) -> String {
    let before = &text[..start];
    let sentence_start = before
        .rfind(['.', '\n'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let after = &text[end..];
    let sentence_end = after
        .find(['.', '\n'])
        .map(|i| end + i + 1)
        .unwrap_or(text.len());
    truncate(text[sentence_start..sentence_end].trim(), 200)
}

fn is_percentage(stat: &Statistic) -> bool {
    stat.value.trim_end().ends_with('%')
        || stat.visualization_type.as_deref() == Some("percentage")
}

/// Parse a raw value string, stripping %, $, and thousands separators.
fn parse_numeric(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept.trim_end())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{Conclusion, GenerateResponse, Output, Section};
    use folio_error::FolioResult;

    struct CannedDriver(String);

    #[async_trait]
    impl FolioDriver for CannedDriver {
        async fn generate(&self, _req: &GenerateRequest) -> FolioResult<GenerateResponse> {
            Ok(GenerateResponse {
                outputs: vec![Output::Text(self.0.clone())],
                usage: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned-1"
        }
    }

    fn content_with(text: &str) -> DocumentContent {
        DocumentContent {
            title: "T".to_string(),
            subtitle: None,
            executive_summary: text.to_string(),
            sections: vec![Section {
                id: "s1".to_string(),
                title: "S".to_string(),
                content: "Body prose without numbers.".to_string(),
                subsections: vec![],
            }],
            conclusion: Conclusion {
                content: "The end.".to_string(),
                call_to_action: String::new(),
            },
            statistics: vec![],
            charts: vec![],
        }
    }

    fn stat(value: &str, context: &str, category: Option<&str>, highlight: bool) -> Statistic {
        Statistic {
            value: value.to_string(),
            context: context.to_string(),
            source: None,
            category: category.map(|c| c.to_string()),
            highlight_worthy: highlight,
            visualization_type: None,
        }
    }

    #[tokio::test]
    async fn test_fallback_extracts_percentage() {
        let stage = StatisticsStage::new(Arc::new(CannedDriver("no json today".to_string())));
        let content = content_with("Remote adoption reached 73% among knowledge workers.");
        let stats = stage
            .extract_statistics(&content, &ResearchBundle::default())
            .await;

        let found = stats.iter().find(|s| s.value == "73%").unwrap();
        assert_eq!(found.visualization_type.as_deref(), Some("percentage"));
        assert!(found.highlight_worthy);
        assert!(found.context.contains("73%"));
    }

    #[tokio::test]
    async fn test_fallback_extracts_currency_and_magnitude() {
        let stage = StatisticsStage::new(Arc::new(CannedDriver("nope".to_string())));
        let content =
            content_with("Spending hit $4.2 billion last year, serving 12 million users.");
        let stats = stage
            .extract_statistics(&content, &ResearchBundle::default())
            .await;

        assert!(stats.iter().any(|s| s.visualization_type.as_deref() == Some("currency")));
        assert!(stats.iter().any(|s| s.visualization_type.as_deref() == Some("magnitude")));
    }

    #[tokio::test]
    async fn test_fallback_supplements_research_statistics() {
        let stage = StatisticsStage::new(Arc::new(CannedDriver("nothing".to_string())));
        let research = ResearchBundle {
            statistics: (0..8)
                .map(|i| stat(&format!("{}0x", i), "research figure", None, false))
                .collect(),
            ..ResearchBundle::default()
        };
        let stats = stage
            .extract_statistics(&content_with("No numbers here."), &research)
            .await;

        assert_eq!(stats.len(), 5);
        assert!(stats.iter().all(|s| s.highlight_worthy));
    }

    #[tokio::test]
    async fn test_parsed_statistics_pass_through() {
        let payload = r#"{"statistics": [{"value": "42%", "context": "of firms", "highlight_worthy": true, "visualization_type": "percentage"}]}"#;
        let stage = StatisticsStage::new(Arc::new(CannedDriver(payload.to_string())));
        let stats = stage
            .extract_statistics(&content_with("text"), &ResearchBundle::default())
            .await;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].value, "42%");
    }

    #[test]
    fn test_format_statistic_shapes() {
        let s = Statistic {
            value: "73%".to_string(),
            context: "of employers keep hybrid schedules".to_string(),
            source: Some("Survey".to_string()),
            category: None,
            highlight_worthy: true,
            visualization_type: None,
        };

        match format_statistic(&s, DisplayStyle::Callout) {
            StatisticDisplay::Callout { primary, attribution, .. } => {
                assert_eq!(primary, "73%");
                assert_eq!(attribution.as_deref(), Some("Survey"));
            }
            other => panic!("expected callout, got {:?}", other),
        }

        match format_statistic(&s, DisplayStyle::Inline) {
            StatisticDisplay::Inline { text } => assert!(text.contains("(Survey)")),
            other => panic!("expected inline, got {:?}", other),
        }

        match format_statistic(&s, DisplayStyle::ChartLabel) {
            StatisticDisplay::ChartLabel { label, .. } => {
                assert!(label.chars().count() <= 24);
            }
            other => panic!("expected chart label, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_callout() {
        assert_eq!(DisplayStyle::parse_lenient("banner"), DisplayStyle::Callout);
        assert_eq!(DisplayStyle::parse_lenient("inline"), DisplayStyle::Inline);
    }

    #[test]
    fn test_suggest_horizontal_bar_needs_three_members_two_parsed() {
        let stats = vec![
            stat("10%", "alpha", Some("adoption"), false),
            stat("20%", "beta", Some("adoption"), false),
            stat("n/a", "gamma", Some("adoption"), false),
        ];
        let suggestions = suggest_visualizations(&stats);
        assert!(suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::Chart(ChartType::HorizontalBar)));

        // Two members only: no bar suggestion
        let too_few = suggest_visualizations(&stats[..2]);
        assert!(!too_few
            .iter()
            .any(|s| s.kind == SuggestionKind::Chart(ChartType::HorizontalBar)));
    }

    #[test]
    fn test_suggest_bar_priority_high_at_four_parsed() {
        let stats: Vec<Statistic> = (0..4)
            .map(|i| stat(&format!("{}%", 10 + i), "ctx", Some("growth"), false))
            .collect();
        let suggestions = suggest_visualizations(&stats);
        let bar = suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Chart(ChartType::HorizontalBar))
            .unwrap();
        assert_eq!(bar.priority, SuggestionPriority::High);
    }

    #[test]
    fn test_suggest_one_callout_per_category() {
        let stats = vec![
            stat("1x", "first", Some("a"), true),
            stat("2x", "second", Some("a"), true),
            stat("3x", "third", Some("b"), true),
        ];
        let suggestions = suggest_visualizations(&stats);
        let callouts: Vec<_> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::Callout)
            .collect();
        assert_eq!(callouts.len(), 2);
    }

    #[test]
    fn test_pie_requires_sum_at_most_hundred() {
        let ok = vec![
            stat("40%", "a", None, false),
            stat("35%", "b", None, false),
        ];
        assert!(suggest_visualizations(&ok)
            .iter()
            .any(|s| s.kind == SuggestionKind::Chart(ChartType::Pie)));

        let over = vec![
            stat("80%", "a", None, false),
            stat("75%", "b", None, false),
        ];
        assert!(!suggest_visualizations(&over)
            .iter()
            .any(|s| s.kind == SuggestionKind::Chart(ChartType::Pie)));
    }

    #[test]
    fn test_parse_numeric_strips_symbols() {
        assert_eq!(parse_numeric("73%"), Some(73.0));
        assert_eq!(parse_numeric("$1,200.50"), Some(1200.5));
        assert_eq!(parse_numeric("2.5 billion"), Some(2.5));
        assert_eq!(parse_numeric("n/a"), None);
    }
}
