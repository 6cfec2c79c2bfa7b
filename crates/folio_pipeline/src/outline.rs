//! Outline stage: converts research into a section plan.

use crate::extraction::parse_json_fragment;
use crate::prompts;
use folio_core::{
    ConclusionSpec, ExecutiveSummarySpec, GenerateRequest, Message, Outline, OutlineSection,
    ResearchBundle,
};
use folio_error::FolioResult;
use folio_interface::FolioDriver;
use std::sync::Arc;

const OUTLINE_TOKEN_BUDGET: u32 = 3000;

/// Guidance embedded into the outline prompt: template requirements plus
/// caller steering from the generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGuidance {
    /// Writing style note (e.g. "authoritative industry report")
    pub style: String,
    /// Target page count for the finished PDF
    pub target_pages: u32,
    /// Section titles the template requires
    pub required_sections: Vec<String>,
    /// Client services the document should position
    pub services: Vec<String>,
    /// Free-form direction from the requesting user
    pub custom_direction: Option<String>,
}

impl Default for TemplateGuidance {
    fn default() -> Self {
        Self {
            style: "authoritative industry report".to_string(),
            target_pages: 12,
            required_sections: Vec::new(),
            services: Vec::new(),
            custom_direction: None,
        }
    }
}

/// Produces and refines document outlines.
pub struct OutlineStage {
    driver: Arc<dyn FolioDriver>,
}

impl OutlineStage {
    /// Create the stage with an injected driver.
    pub fn new(driver: Arc<dyn FolioDriver>) -> Self {
        Self { driver }
    }

    /// Generate an outline from research.
    ///
    /// On parse failure returns a single-section outline ("Introduction")
    /// with the raw model text attached for diagnostics; generation proceeds
    /// rather than aborting.
    ///
    /// # Errors
    ///
    /// Returns an error only if the LLM call itself fails.
    #[tracing::instrument(skip(self, research, guidance), fields(topic = %topic))]
    pub async fn generate_outline(
        &self,
        topic: &str,
        research: &ResearchBundle,
        guidance: &TemplateGuidance,
    ) -> FolioResult<Outline> {
        let prompt = prompts::outline_prompt(topic, research, guidance);
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(OUTLINE_TOKEN_BUDGET),
            temperature: None,
            model: None,
        };

        let response = self.driver.generate(&request).await?;
        let raw = response.text();

        match parse_json_fragment::<Outline>(&raw) {
            Some(mut outline) => {
                assign_section_ids(&mut outline);
                tracing::info!(sections = outline.sections.len(), "Outline parsed");
                Ok(outline)
            }
            None => {
                tracing::warn!(
                    response_len = raw.len(),
                    "Outline response did not parse, using single-section fallback"
                );
                Ok(Self::fallback_outline(topic, raw))
            }
        }
    }

    /// Refine an outline with feedback.
    ///
    /// On parse failure the original outline is returned unchanged;
    /// refinement failure must not regress content.
    ///
    /// # Errors
    ///
    /// Returns an error only if the LLM call itself fails.
    #[tracing::instrument(skip(self, outline), fields(feedback_len = feedback.len()))]
    pub async fn refine_outline(&self, outline: &Outline, feedback: &str) -> FolioResult<Outline> {
        let prompt = prompts::refine_prompt(outline, feedback);
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(OUTLINE_TOKEN_BUDGET),
            temperature: None,
            model: None,
        };

        let response = self.driver.generate(&request).await?;
        let raw = response.text();

        match parse_json_fragment::<Outline>(&raw) {
            Some(mut refined) => {
                assign_section_ids(&mut refined);
                Ok(refined)
            }
            None => {
                tracing::warn!("Refinement did not parse, keeping original outline");
                Ok(outline.clone())
            }
        }
    }

    fn fallback_outline(topic: &str, raw: String) -> Outline {
        Outline {
            title: topic.to_string(),
            subtitle: None,
            executive_summary: ExecutiveSummarySpec::default(),
            sections: vec![OutlineSection {
                id: "section-1".to_string(),
                title: "Introduction".to_string(),
                purpose: format!("Introduce {}", topic),
                word_count: 400,
                subsections: Vec::new(),
            }],
            conclusion: ConclusionSpec::default(),
            raw_response: Some(raw),
        }
    }
}

/// Fill in ids the model omitted, keeping any it provided.
fn assign_section_ids(outline: &mut Outline) {
    for (i, section) in outline.sections.iter_mut().enumerate() {
        if section.id.is_empty() {
            section.id = format!("section-{}", i + 1);
        }
        for (j, subsection) in section.subsections.iter_mut().enumerate() {
            if subsection.id.is_empty() {
                subsection.id = format!("{}-{}", section.id, j + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{GenerateResponse, Output};

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

    fn research() -> ResearchBundle {
        ResearchBundle {
            key_findings: vec!["finding".to_string()],
            ..ResearchBundle::default()
        }
    }

    #[tokio::test]
    async fn test_outline_parses_and_assigns_missing_ids() {
        let response = r#"{
            "title": "Remote Work",
            "executive_summary": {"key_points": ["a"], "word_count": 200},
            "sections": [
                {"title": "One", "word_count": 300, "subsections": [{"title": "Sub", "word_count": 150}]},
                {"id": "custom", "title": "Two", "word_count": 300}
            ],
            "conclusion": {"key_points": [], "word_count": 250}
        }"#;
        let stage = OutlineStage::new(Arc::new(CannedDriver(response.to_string())));
        let outline = stage
            .generate_outline("Remote Work", &research(), &TemplateGuidance::default())
            .await
            .unwrap();

        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[0].id, "section-1");
        assert_eq!(outline.sections[0].subsections[0].id, "section-1-1");
        assert_eq!(outline.sections[1].id, "custom");
        assert!(outline.raw_response.is_none());
    }

    #[tokio::test]
    async fn test_outline_fallback_preserves_raw_response() {
        let stage = OutlineStage::new(Arc::new(CannedDriver("I can't do that".to_string())));
        let outline = stage
            .generate_outline("Remote Work", &research(), &TemplateGuidance::default())
            .await
            .unwrap();

        assert_eq!(outline.sections.len(), 1);
        assert_eq!(outline.sections[0].title, "Introduction");
        assert_eq!(outline.raw_response.as_deref(), Some("I can't do that"));
    }

    #[tokio::test]
    async fn test_refine_failure_returns_original() {
        let stage = OutlineStage::new(Arc::new(CannedDriver("hmm, no".to_string())));
        let original = OutlineStage::fallback_outline("topic", "raw".to_string());
        let refined = stage.refine_outline(&original, "add a section").await.unwrap();
        assert_eq!(refined, original);
    }
}
