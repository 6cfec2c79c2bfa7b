//! Generation options attached to a document.

use serde::{Deserialize, Serialize};

/// Writing tone for generated prose.
///
/// # Examples
///
/// ```
/// use folio_core::Tone;
/// use std::str::FromStr;
///
/// assert_eq!(Tone::from_str("academic").unwrap(), Tone::Academic);
/// assert_eq!(format!("{}", Tone::Professional), "professional");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tone {
    /// Clear, authoritative business writing
    #[default]
    Professional,
    /// Approachable, first-person-friendly writing
    Conversational,
    /// Precise, citation-heavy writing
    Academic,
    /// Action-oriented writing that argues a position
    Persuasive,
}

impl Tone {
    /// Descriptive style string injected into writing prompts.
    ///
    /// Unrecognized tones never reach here; lenient parsing falls back to
    /// `Professional` before prompt assembly.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "a professional, authoritative tone with clear business language"
            }
            Tone::Conversational => {
                "a conversational, approachable tone that speaks directly to the reader"
            }
            Tone::Academic => "an academic, rigorous tone with precise terminology",
            Tone::Persuasive => "a persuasive, confident tone that builds toward action",
        }
    }

    /// Parse a tone string, defaulting to `Professional` for unknown input.
    pub fn parse_lenient(tone: &str) -> Self {
        tone.parse().unwrap_or_default()
    }
}

/// Research depth, mapped to a per-call token budget.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResearchDepth {
    /// Quick pass, 1000-token budget
    Shallow,
    /// Default pass, 2000-token budget
    #[default]
    Standard,
    /// Exhaustive pass, 4000-token budget
    Deep,
}

impl ResearchDepth {
    /// Token budget for research calls at this depth.
    pub fn token_budget(&self) -> u32 {
        match self {
            ResearchDepth::Shallow => 1000,
            ResearchDepth::Standard => 2000,
            ResearchDepth::Deep => 4000,
        }
    }
}

/// Caller-supplied brand values merged over rendering defaults.
///
/// Every field is optional; rendering substitutes its documented default for
/// any missing value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Branding {
    /// Primary brand color as a hex string (e.g. "#1a3a5c")
    #[serde(default)]
    pub primary_color: Option<String>,
    /// Secondary brand color
    #[serde(default)]
    pub secondary_color: Option<String>,
    /// Accent color for callouts and rules
    #[serde(default)]
    pub accent_color: Option<String>,
    /// Body text color
    #[serde(default)]
    pub text_color: Option<String>,
    /// Page background color
    #[serde(default)]
    pub background_color: Option<String>,
    /// Font family name
    #[serde(default)]
    pub font_family: Option<String>,
}

/// Options governing one generation run.
///
/// # Examples
///
/// ```
/// use folio_core::{GenerationOptions, Tone, ResearchDepth};
///
/// let options = GenerationOptions::builder()
///     .tone(Tone::Conversational)
///     .keywords(vec!["remote".to_string(), "hybrid".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(*options.depth(), ResearchDepth::Standard);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(default, setter(into))]
pub struct GenerationOptions {
    /// Writing tone
    #[serde(default)]
    tone: Tone,
    /// Keywords steering research
    #[serde(default)]
    keywords: Vec<String>,
    /// Target industry for industry analysis, when known
    #[serde(default)]
    industry: Option<String>,
    /// Client services to weave into positioning
    #[serde(default)]
    services: Vec<String>,
    /// Free-form direction from the requesting user
    #[serde(default)]
    custom_direction: Option<String>,
    /// Research depth
    #[serde(default)]
    depth: ResearchDepth,
    /// Named rendering template
    #[serde(default)]
    template_id: Option<String>,
    /// Whether distribution should be queued after completion.
    /// Acted on by an external collaborator, never by the pipeline.
    #[serde(default)]
    auto_distribute: bool,
    /// Brand values for rendering
    #[serde(default)]
    branding: Branding,
}

impl GenerationOptions {
    /// Builder entry point.
    pub fn builder() -> GenerationOptionsBuilder {
        GenerationOptionsBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_parse_lenient_falls_back_to_professional() {
        assert_eq!(Tone::parse_lenient("sarcastic"), Tone::Professional);
        assert_eq!(Tone::parse_lenient("PERSUASIVE"), Tone::Persuasive);
    }

    #[test]
    fn test_depth_budgets() {
        assert_eq!(ResearchDepth::Shallow.token_budget(), 1000);
        assert_eq!(ResearchDepth::Standard.token_budget(), 2000);
        assert_eq!(ResearchDepth::Deep.token_budget(), 4000);
    }
}
