//! Document templates and the rendering context they produce.
//!
//! A template shapes `DocumentContent` into the flat [`RenderContext`] the
//! composer lays out. Lookup by name falls back to the built-in standard
//! template so rendering proceeds even when a named template is missing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use folio_core::{DocumentContent, MediaSource, Statistic};
use std::collections::HashMap;

/// Most highlight-worthy statistics surfaced as callouts.
const MAX_CALLOUTS: usize = 4;

/// A prominent statistic callout.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    /// The value, displayed large
    pub primary: String,
    /// The context line under the value
    pub secondary: String,
    /// Source attribution, when known
    pub attribution: Option<String>,
}

impl Callout {
    fn from_statistic(stat: &Statistic) -> Self {
        Self {
            primary: stat.value.clone(),
            secondary: stat.context.clone(),
            attribution: stat.source.clone(),
        }
    }
}

/// A chart ready for embedding: raw PNG bytes plus its title.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    /// Chart title, drawn as a caption
    pub title: String,
    /// PNG bytes
    pub bytes: Vec<u8>,
}

/// Everything the composer needs to lay out a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderContext {
    /// Document title
    pub title: String,
    /// Optional subtitle
    pub subtitle: Option<String>,
    /// Executive summary prose
    pub executive_summary: String,
    /// Body sections in order
    pub sections: Vec<ContextSection>,
    /// Conclusion prose
    pub conclusion: String,
    /// Closing call to action
    pub call_to_action: String,
    /// Statistic callouts, at most [`MAX_CALLOUTS`]
    pub callouts: Vec<Callout>,
    /// Decoded chart images
    pub charts: Vec<ChartImage>,
}

/// A section within the rendering context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSection {
    /// Section heading
    pub title: String,
    /// Section prose, possibly empty when subsections carry the content
    pub content: String,
    /// (subheading, prose) pairs
    pub subsections: Vec<(String, String)>,
}

/// Shapes document content into a rendering context.
pub trait DocumentTemplate: Send + Sync {
    /// Template name used for registry lookup.
    fn name(&self) -> &str;

    /// Build the rendering context for a document.
    fn build_context(&self, content: &DocumentContent) -> RenderContext;
}

/// The built-in layout: all sections in order, callouts from
/// highlight-worthy statistics, every rendered chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTemplate;

impl DocumentTemplate for StandardTemplate {
    fn name(&self) -> &str {
        "standard"
    }

    fn build_context(&self, content: &DocumentContent) -> RenderContext {
        let callouts = content
            .statistics
            .iter()
            .filter(|stat| stat.highlight_worthy)
            .take(MAX_CALLOUTS)
            .map(Callout::from_statistic)
            .collect();

        let charts = content
            .charts
            .iter()
            .filter_map(|chart| {
                let bytes = match &chart.image {
                    MediaSource::Base64(encoded) => STANDARD.decode(encoded).ok()?,
                    MediaSource::Binary(bytes) => bytes.clone(),
                    MediaSource::Url(_) => return None,
                };
                Some(ChartImage {
                    title: chart.title.clone(),
                    bytes,
                })
            })
            .collect();

        RenderContext {
            title: content.title.clone(),
            subtitle: content.subtitle.clone(),
            executive_summary: content.executive_summary.clone(),
            sections: content
                .sections
                .iter()
                .map(|section| ContextSection {
                    title: section.title.clone(),
                    content: section.content.clone(),
                    subsections: section
                        .subsections
                        .iter()
                        .map(|sub| (sub.title.clone(), sub.content.clone()))
                        .collect(),
                })
                .collect(),
            conclusion: content.conclusion.content.clone(),
            call_to_action: content.conclusion.call_to_action.clone(),
            callouts,
            charts,
        }
    }
}

/// Named template registry with a built-in fallback.
pub struct TemplateRegistry {
    templates: HashMap<String, Box<dyn DocumentTemplate>>,
    fallback: StandardTemplate,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Create a registry containing only the built-in template.
    pub fn new() -> Self {
        let mut registry = Self {
            templates: HashMap::new(),
            fallback: StandardTemplate,
        };
        registry.register(Box::new(StandardTemplate));
        registry
    }

    /// Register a template under its own name.
    pub fn register(&mut self, template: Box<dyn DocumentTemplate>) {
        self.templates.insert(template.name().to_string(), template);
    }

    /// Resolve a template by name.
    ///
    /// An unknown or absent name resolves to the built-in template so
    /// rendering never aborts over a missing template asset.
    pub fn resolve(&self, template_id: Option<&str>) -> &dyn DocumentTemplate {
        match template_id {
            Some(name) => match self.templates.get(name) {
                Some(template) => template.as_ref(),
                None => {
                    tracing::warn!(template = %name, "Template not found, using built-in layout");
                    &self.fallback
                }
            },
            None => &self.fallback,
        }
    }
}
