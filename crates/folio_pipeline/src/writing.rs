//! Writing stage: prose generation per outline node.
//!
//! Unlike research and outline, this stage does not self-insulate: a failed
//! call propagates to the orchestrator's failure handler, because every
//! content unit is required for stage success.

use crate::prompts;
use folio_core::{
    Conclusion, DocumentContent, GenerateRequest, Message, Outline, ResearchBundle, Section,
    Subsection, Tone,
};
use folio_error::FolioResult;
use folio_interface::FolioDriver;
use std::sync::Arc;

/// Statistics woven into one section, at most this many.
const MAX_WOVEN_STATISTICS: usize = 3;

/// Context bundle for one section call.
#[derive(Debug, Clone, Default)]
pub struct SectionContext {
    /// Document topic
    pub topic: String,
    /// Points the section must cover
    pub key_points: Vec<String>,
    /// Statistics to weave in, already formatted for the prompt
    pub statistics: Vec<String>,
}

/// Generates document prose section by section.
pub struct WritingStage {
    driver: Arc<dyn FolioDriver>,
}

impl WritingStage {
    /// Create the stage with an injected driver.
    pub fn new(driver: Arc<dyn FolioDriver>) -> Self {
        Self { driver }
    }

    /// Generate one content unit.
    ///
    /// The token budget is `2 x target_word_count` to leave headroom.
    ///
    /// # Errors
    ///
    /// Propagates LLM call failures; there is no fallback for prose.
    #[tracing::instrument(skip(self, context), fields(title = %title, words = target_word_count))]
    pub async fn generate_section(
        &self,
        title: &str,
        context: &SectionContext,
        tone: Tone,
        target_word_count: u32,
    ) -> FolioResult<String> {
        let prompt = prompts::section_prompt(
            title,
            &context.topic,
            &context.key_points,
            &context.statistics,
            tone,
            target_word_count,
        );
        self.call(prompt, target_word_count).await
    }

    /// Generate the full document in outline order.
    ///
    /// Strictly sequential: executive summary first, then each section (flat
    /// content, or one call per subsection when subsections exist), then the
    /// conclusion with its call to action.
    ///
    /// # Errors
    ///
    /// Propagates the first failed call.
    #[tracing::instrument(skip(self, outline, research), fields(sections = outline.sections.len(), tone = %tone))]
    pub async fn generate_full_document(
        &self,
        outline: &Outline,
        research: &ResearchBundle,
        tone: Tone,
    ) -> FolioResult<DocumentContent> {
        let topic = outline.title.clone();

        let summary_prompt = prompts::summary_prompt(
            &outline.title,
            &topic,
            &outline.executive_summary.key_points,
            tone,
            outline.executive_summary.word_count,
        );
        let executive_summary = self
            .call(summary_prompt, outline.executive_summary.word_count)
            .await?;

        let mut sections = Vec::with_capacity(outline.sections.len());
        for planned in &outline.sections {
            if planned.subsections.is_empty() {
                let context = SectionContext {
                    topic: topic.clone(),
                    key_points: vec![planned.purpose.clone()],
                    statistics: Vec::new(),
                };
                let content = self
                    .generate_section(&planned.title, &context, tone, planned.word_count)
                    .await?;
                sections.push(Section {
                    id: planned.id.clone(),
                    title: planned.title.clone(),
                    content,
                    subsections: Vec::new(),
                });
            } else {
                let mut subsections = Vec::with_capacity(planned.subsections.len());
                for sub in &planned.subsections {
                    let statistics = if sub.include_statistics {
                        woven_statistics(research)
                    } else {
                        Vec::new()
                    };
                    let context = SectionContext {
                        topic: topic.clone(),
                        key_points: sub.key_points.clone(),
                        statistics,
                    };
                    let content = self
                        .generate_section(&sub.title, &context, tone, sub.word_count)
                        .await?;
                    subsections.push(Subsection {
                        id: sub.id.clone(),
                        title: sub.title.clone(),
                        content,
                    });
                }
                sections.push(Section {
                    id: planned.id.clone(),
                    title: planned.title.clone(),
                    content: String::new(),
                    subsections,
                });
            }
        }

        let conclusion_prompt = prompts::conclusion_prompt(
            &outline.title,
            &outline.conclusion.key_points,
            tone,
            outline.conclusion.word_count,
        );
        let conclusion_text = self
            .call(conclusion_prompt, outline.conclusion.word_count)
            .await?;
        let conclusion = split_call_to_action(conclusion_text);

        Ok(DocumentContent {
            title: outline.title.clone(),
            subtitle: outline.subtitle.clone(),
            executive_summary,
            sections,
            conclusion,
            statistics: Vec::new(),
            charts: Vec::new(),
        })
    }

    async fn call(&self, prompt: String, target_word_count: u32) -> FolioResult<String> {
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(target_word_count.max(100) * 2),
            temperature: None,
            model: None,
        };
        let response = self.driver.generate(&request).await?;
        Ok(response.text().trim().to_string())
    }
}

/// Format up to [`MAX_WOVEN_STATISTICS`] research statistics for a prompt.
fn woven_statistics(research: &ResearchBundle) -> Vec<String> {
    research
        .statistics
        .iter()
        .take(MAX_WOVEN_STATISTICS)
        .map(|s| format!("{} ({})", s.value, s.context))
        .collect()
}

/// The conclusion's final paragraph is the call to action.
fn split_call_to_action(text: String) -> Conclusion {
    match text.rsplit_once("\n\n") {
        Some((content, cta)) if !content.trim().is_empty() => Conclusion {
            content: content.trim().to_string(),
            call_to_action: cta.trim().to_string(),
        },
        _ => Conclusion {
            content: text,
            call_to_action: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{ExecutiveSummarySpec, GenerateResponse, Output, OutlineSection, OutlineSubsection};
    use std::sync::Mutex;

    /// Echoes a numbered response and records requested token budgets.
    struct CountingDriver {
        calls: Mutex<Vec<Option<u32>>>,
    }

    impl CountingDriver {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FolioDriver for CountingDriver {
        async fn generate(&self, req: &GenerateRequest) -> FolioResult<GenerateResponse> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(req.max_tokens);
            let n = calls.len();
            Ok(GenerateResponse {
                outputs: vec![Output::Text(format!(
                    "Prose for call {}.\n\nAct now on call {}.",
                    n, n
                ))],
                usage: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "counting"
        }

        fn model_name(&self) -> &str {
            "counting-1"
        }
    }

    fn outline() -> Outline {
        Outline {
            title: "Remote Work".to_string(),
            subtitle: None,
            executive_summary: ExecutiveSummarySpec {
                key_points: vec!["point".to_string()],
                word_count: 200,
            },
            sections: vec![
                OutlineSection {
                    id: "section-1".to_string(),
                    title: "Flat".to_string(),
                    purpose: "explain".to_string(),
                    word_count: 400,
                    subsections: Vec::new(),
                },
                OutlineSection {
                    id: "section-2".to_string(),
                    title: "Nested".to_string(),
                    purpose: "detail".to_string(),
                    word_count: 0,
                    subsections: vec![
                        OutlineSubsection {
                            id: "section-2-1".to_string(),
                            title: "Sub A".to_string(),
                            key_points: vec!["a".to_string()],
                            word_count: 150,
                            include_statistics: true,
                            include_chart: false,
                        },
                        OutlineSubsection {
                            id: "section-2-2".to_string(),
                            title: "Sub B".to_string(),
                            key_points: vec![],
                            word_count: 150,
                            include_statistics: false,
                            include_chart: false,
                        },
                    ],
                },
            ],
            conclusion: folio_core::ConclusionSpec {
                key_points: vec![],
                word_count: 250,
            },
            raw_response: None,
        }
    }

    #[tokio::test]
    async fn test_full_document_matches_outline_shape() {
        let stage = WritingStage::new(Arc::new(CountingDriver::new()));
        let content = stage
            .generate_full_document(&outline(), &ResearchBundle::default(), Tone::Professional)
            .await
            .unwrap();

        assert_eq!(content.sections.len(), 2);
        assert!(!content.executive_summary.is_empty());
        assert!(content.sections[0].subsections.is_empty());
        assert!(!content.sections[0].content.is_empty());
        assert_eq!(content.sections[1].subsections.len(), 2);
        assert!(content.sections[1].content.is_empty());
        assert!(!content.conclusion.call_to_action.is_empty());
    }

    #[tokio::test]
    async fn test_token_budget_is_twice_word_target() {
        let driver = Arc::new(CountingDriver::new());
        let stage = WritingStage::new(driver.clone());
        stage
            .generate_section("Title", &SectionContext::default(), Tone::Academic, 500)
            .await
            .unwrap();
        assert_eq!(driver.calls.lock().unwrap()[0], Some(1000));
    }

    #[test]
    fn test_split_call_to_action() {
        let conclusion =
            split_call_to_action("Body paragraph.\n\nMore body.\n\nCall us today.".to_string());
        assert!(conclusion.content.ends_with("More body."));
        assert_eq!(conclusion.call_to_action, "Call us today.");

        let single = split_call_to_action("Only one paragraph.".to_string());
        assert_eq!(single.content, "Only one paragraph.");
        assert!(single.call_to_action.is_empty());
    }
}
