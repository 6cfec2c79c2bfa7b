//! Document record mutated by the pipeline.

use chrono::{DateTime, Utc};
use folio_core::{DocumentContent, GenerationOptions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a document.
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
pub enum DocumentStatus {
    /// Created, generation not yet requested
    #[default]
    Draft,
    /// Generation in flight
    Generating,
    /// Generation finished, PDF available
    Ready,
    /// Pushed to distribution channels
    Distributed,
    /// Generation failed
    Failed,
}

/// The target artifact of a generation run.
///
/// Created before the pipeline starts and mutated exclusively by the
/// orchestrator during generation; immutable once `Ready`/`Failed` apart
/// from administrative edits outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identity
    pub id: Uuid,
    /// Owning agency
    pub agency_id: Uuid,
    /// Owning client
    pub client_id: Uuid,
    /// Working title; replaced by the generated title on completion
    pub title: String,
    /// URL-safe slug derived from the title
    pub slug: String,
    /// Topic the document is generated around
    pub topic: String,
    /// Lifecycle status
    pub status: DocumentStatus,
    /// Options governing generation
    pub options: GenerationOptions,
    /// Generated content, present once generation completes
    pub content: Option<DocumentContent>,
    /// Locator of the rendered PDF in the storage sink
    pub pdf_location: Option<String>,
    /// Derived metric: total words
    pub word_count: Option<u32>,
    /// Derived metric: PDF pages
    pub page_count: Option<u32>,
    /// Derived metric: statistics carried in content
    pub statistics_count: Option<u32>,
    /// Derived metric: recommended sources found during research
    pub sources_count: Option<u32>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a draft document for a topic.
    pub fn new(
        agency_id: Uuid,
        client_id: Uuid,
        title: impl Into<String>,
        topic: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            agency_id,
            client_id,
            slug: slugify(&title),
            title,
            topic: topic.into(),
            status: DocumentStatus::Draft,
            options,
            content: None,
            pdf_location: None,
            word_count: None,
            page_count: None,
            statistics_count: None,
            sources_count: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lowercase, hyphen-separated slug limited to 200 characters.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    slug.chars().take(200).collect()
}
