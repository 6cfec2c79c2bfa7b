//! Research stage: topic research and industry analysis.

use crate::extraction::parse_json_fragment;
use crate::prompts;
use folio_core::{
    GenerateRequest, IndustryAnalysis, Message, ResearchBundle, ResearchDepth, Statistic,
};
use folio_error::FolioResult;
use folio_interface::FolioDriver;
use std::sync::Arc;

const INDUSTRY_TOKEN_BUDGET: u32 = 2000;
const FALLBACK_FINDING_CHARS: usize = 500;

/// Produces structured research for a topic.
///
/// Malformed model output is absorbed here: both operations return a usable
/// structure for any response text. Transport failures still propagate.
pub struct ResearchStage {
    driver: Arc<dyn FolioDriver>,
}

impl ResearchStage {
    /// Create the stage with an injected driver.
    pub fn new(driver: Arc<dyn FolioDriver>) -> Self {
        Self { driver }
    }

    /// Research a topic at the given depth.
    ///
    /// On parse failure the bundle contains one synthetic finding built from
    /// the raw response so downstream stages never see an empty structure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the LLM call itself fails.
    #[tracing::instrument(skip(self, keywords), fields(topic = %topic, depth = %depth))]
    pub async fn research_topic(
        &self,
        topic: &str,
        keywords: &[String],
        depth: ResearchDepth,
    ) -> FolioResult<ResearchBundle> {
        let prompt = prompts::research_prompt(topic, keywords, depth);
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(depth.token_budget()),
            temperature: None,
            model: None,
        };

        let response = self.driver.generate(&request).await?;
        let raw = response.text();

        match parse_json_fragment::<ResearchBundle>(&raw) {
            Some(bundle) => {
                tracing::info!(
                    findings = bundle.key_findings.len(),
                    statistics = bundle.statistics.len(),
                    "Research parsed"
                );
                Ok(bundle)
            }
            None => {
                tracing::warn!(
                    response_len = raw.len(),
                    "Research response did not parse, using synthetic finding"
                );
                Ok(Self::fallback_bundle(&raw))
            }
        }
    }

    /// Analyze industry context for a topic.
    ///
    /// On parse failure returns an analysis with the industry name preserved
    /// and empty sub-fields.
    ///
    /// # Errors
    ///
    /// Returns an error only if the LLM call itself fails.
    #[tracing::instrument(skip(self), fields(industry = %industry, topic = %topic))]
    pub async fn analyze_industry(
        &self,
        industry: &str,
        topic: &str,
    ) -> FolioResult<IndustryAnalysis> {
        let prompt = prompts::industry_prompt(industry, topic);
        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(INDUSTRY_TOKEN_BUDGET),
            temperature: None,
            model: None,
        };

        let response = self.driver.generate(&request).await?;
        let raw = response.text();

        match parse_json_fragment::<IndustryAnalysis>(&raw) {
            Some(mut analysis) => {
                // The caller's industry name wins over whatever the model echoed
                analysis.industry = industry.to_string();
                Ok(analysis)
            }
            None => {
                tracing::warn!("Industry analysis did not parse, using empty analysis");
                Ok(IndustryAnalysis {
                    industry: industry.to_string(),
                    ..IndustryAnalysis::default()
                })
            }
        }
    }

    fn fallback_bundle(raw: &str) -> ResearchBundle {
        let truncated: String = raw.chars().take(FALLBACK_FINDING_CHARS).collect();
        ResearchBundle {
            key_findings: vec![truncated],
            statistics: Vec::<Statistic>::new(),
            ..ResearchBundle::default()
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

    #[tokio::test]
    async fn test_research_parses_structured_response() {
        let driver = Arc::new(CannedDriver(
            r#"{"key_findings": ["finding one"], "trends": ["trend"], "statistics": []}"#
                .to_string(),
        ));
        let stage = ResearchStage::new(driver);
        let bundle = stage
            .research_topic("remote work", &[], ResearchDepth::Standard)
            .await
            .unwrap();
        assert_eq!(bundle.key_findings, vec!["finding one"]);
        assert_eq!(bundle.trends, vec!["trend"]);
    }

    #[tokio::test]
    async fn test_research_fallback_truncates_raw_text() {
        let long_text = "x".repeat(2000);
        let stage = ResearchStage::new(Arc::new(CannedDriver(long_text)));
        let bundle = stage
            .research_topic("remote work", &[], ResearchDepth::Shallow)
            .await
            .unwrap();
        assert_eq!(bundle.key_findings.len(), 1);
        assert_eq!(bundle.key_findings[0].len(), 500);
        assert!(bundle.statistics.is_empty());
    }

    #[tokio::test]
    async fn test_industry_fallback_preserves_name() {
        let stage = ResearchStage::new(Arc::new(CannedDriver("no json at all".to_string())));
        let analysis = stage
            .analyze_industry("logistics", "supply chains")
            .await
            .unwrap();
        assert_eq!(analysis.industry, "logistics");
        assert!(analysis.trends.is_empty());
    }
}
