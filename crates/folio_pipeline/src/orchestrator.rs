//! Pipeline orchestrator.
//!
//! Runs the fixed stage sequence for one job, committing a progress
//! checkpoint to the job store after every stage so polling observers see
//! live state. All stage errors surface at a single boundary in [`run`],
//! which marks the job and document failed; no partial content is written
//! to the document on failure.
//!
//! [`run`]: GenerationOrchestrator::run

use crate::statistics::suggest_visualizations;
use crate::{OutlineStage, PipelineConfig, ResearchStage, StatisticsStage, TemplateGuidance, WritingStage};
use folio_charts::{ChartRenderer, ChartStyle};
use folio_core::{DocumentContent, GenerateRequest, GenerateResponse, TokenUsage};
use folio_error::{FolioError, FolioErrorKind, FolioResult};
use folio_interface::{
    Document, DocumentStatus, DocumentStore, FolioDriver, GenerationJob, JobStatus, JobStore,
    StorageSink,
};
use folio_render::PdfComposer;
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Driver decorator that accumulates token usage across calls.
///
/// Stages receive this wrapper; the orchestrator reads the total afterwards
/// to update the job's resource counters.
pub struct MeteredDriver {
    inner: Arc<dyn FolioDriver>,
    usage: Mutex<TokenUsage>,
    model: Option<String>,
}

impl MeteredDriver {
    /// Wrap a driver, optionally pinning a model for every call.
    pub fn new(inner: Arc<dyn FolioDriver>, model: Option<String>) -> Self {
        Self {
            inner,
            usage: Mutex::new(TokenUsage::default()),
            model,
        }
    }

    /// Total usage accumulated so far.
    pub fn usage(&self) -> TokenUsage {
        *self.usage.lock().expect("usage lock poisoned")
    }
}

#[async_trait::async_trait]
impl FolioDriver for MeteredDriver {
    async fn generate(&self, req: &GenerateRequest) -> FolioResult<GenerateResponse> {
        let request = match (&req.model, &self.model) {
            (None, Some(model)) => GenerateRequest {
                model: Some(model.clone()),
                ..req.clone()
            },
            _ => req.clone(),
        };
        let response = self.inner.generate(&request).await?;
        if let Some(usage) = &response.usage {
            self.usage.lock().expect("usage lock poisoned").add(usage);
        }
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Everything a successful pipeline run produces.
struct PipelineOutput {
    content: DocumentContent,
    pdf_location: String,
    page_count: u32,
    sources_count: u32,
}

/// Sequences the generation stages for one job at a time.
pub struct GenerationOrchestrator {
    driver: Arc<dyn FolioDriver>,
    jobs: Arc<dyn JobStore>,
    documents: Arc<dyn DocumentStore>,
    sink: Arc<dyn StorageSink>,
    charts: ChartRenderer,
    composer: PdfComposer,
    config: PipelineConfig,
}

impl GenerationOrchestrator {
    /// Create an orchestrator over its collaborators.
    pub fn new(
        driver: Arc<dyn FolioDriver>,
        jobs: Arc<dyn JobStore>,
        documents: Arc<dyn DocumentStore>,
        sink: Arc<dyn StorageSink>,
        config: PipelineConfig,
    ) -> Self {
        let charts = match config.chart_font_path() {
            Some(path) => ChartRenderer::with_font_file(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Configured chart font failed to load, using defaults");
                ChartRenderer::new()
            }),
            None => ChartRenderer::new(),
        };
        Self {
            driver,
            jobs,
            documents,
            sink,
            charts,
            composer: PdfComposer::new(),
            config,
        }
    }

    /// Worker entry point: run the full pipeline for a job.
    ///
    /// Idempotent against queue redelivery: a job that is not `pending` is
    /// left alone. Stage failures are captured here, marking the job and
    /// document failed; the returned error covers only infrastructure
    /// problems loading or persisting the records themselves.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn run(&self, job_id: Uuid) -> FolioResult<()> {
        let mut job = self.jobs.get(job_id).await?;
        if *job.status() != JobStatus::Pending {
            tracing::warn!(status = %job.status(), "Job is not pending, skipping redelivered run");
            return Ok(());
        }
        let mut document = self.documents.get(*job.document_id()).await?;

        job.start()?;
        self.jobs.put(&job).await?;

        document.status = DocumentStatus::Generating;
        document.updated_at = chrono::Utc::now();
        self.documents.put(&document).await?;

        let metered = Arc::new(MeteredDriver::new(
            self.driver.clone(),
            self.config.model().clone(),
        ));
        let result = self.execute(&document, &mut job, metered.clone()).await;

        let usage = metered.usage();
        let cost = usage.calculate_cost(
            *self.config.prompt_price_per_million(),
            *self.config.completion_price_per_million(),
        );
        job.add_usage(*usage.total_tokens() as u64, cost);

        match result {
            Ok(output) => {
                tracing::info!(
                    pages = output.page_count,
                    words = output.content.word_count(),
                    "Generation completed"
                );
                document.word_count = Some(output.content.word_count() as u32);
                document.statistics_count = Some(output.content.statistics_count() as u32);
                document.sources_count = Some(output.sources_count);
                document.page_count = Some(output.page_count);
                document.pdf_location = Some(output.pdf_location);
                document.title = output.content.title.clone();
                document.content = Some(output.content);
                document.status = DocumentStatus::Ready;
                document.updated_at = chrono::Utc::now();
                self.documents.put(&document).await?;

                job.complete()?;
                self.jobs.put(&job).await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation failed");
                // Single failure boundary: capture the error, no partial
                // content reaches the document.
                if job.fail(e.to_string(), Some(error_code(&e).to_string())).is_ok() {
                    self.jobs.put(&job).await?;
                }
                document.status = DocumentStatus::Failed;
                document.updated_at = chrono::Utc::now();
                self.documents.put(&document).await?;
            }
        }

        Ok(())
    }

    /// The stage sequence. Any error propagates to the boundary in `run`.
    async fn execute(
        &self,
        document: &Document,
        job: &mut GenerationJob,
        driver: Arc<MeteredDriver>,
    ) -> FolioResult<PipelineOutput> {
        let options = &document.options;
        let topic = &document.topic;

        // topic_analysis (5%) was committed by start()
        job.record_stage("topic_analysis", json!({ "topic": topic }));
        self.jobs.put(job).await?;

        // keyword_research (10%)
        let keywords = options.keywords().clone();
        job.checkpoint(JobStatus::Researching, "keyword_research", 10)?;
        job.record_stage("keyword_research", json!({ "keywords": keywords }));
        self.jobs.put(job).await?;

        // web_research (25%)
        let research_stage = ResearchStage::new(driver.clone());
        let mut research = research_stage
            .research_topic(topic, &keywords, *options.depth())
            .await?;
        job.checkpoint(JobStatus::Researching, "web_research", 25)?;
        job.record_stage(
            "web_research",
            json!({
                "key_findings": research.key_findings.len(),
                "statistics": research.statistics.len(),
                "sources": research.recommended_sources.len(),
            }),
        );
        self.jobs.put(job).await?;

        // industry_analysis (35%)
        let industry_summary = match options.industry() {
            Some(industry) => {
                let analysis = research_stage.analyze_industry(industry, topic).await?;
                let summary = json!({ "industry": analysis.industry });
                research.industry_analysis = Some(analysis);
                summary
            }
            None => json!({ "skipped": true }),
        };
        job.checkpoint(JobStatus::Researching, "industry_analysis", 35)?;
        job.record_stage("industry_analysis", industry_summary);
        self.jobs.put(job).await?;

        // outline_generation (45%)
        let outline_stage = OutlineStage::new(driver.clone());
        let guidance = TemplateGuidance {
            services: options.services().clone(),
            custom_direction: options.custom_direction().clone(),
            ..TemplateGuidance::default()
        };
        let outline = outline_stage
            .generate_outline(topic, &research, &guidance)
            .await?;
        job.checkpoint(JobStatus::Writing, "outline_generation", 45)?;
        job.record_stage(
            "outline_generation",
            json!({
                "sections": outline.sections.len(),
                "fallback": outline.raw_response.is_some(),
                "outline": serde_json::to_value(&outline).unwrap_or(serde_json::Value::Null),
            }),
        );
        self.jobs.put(job).await?;

        // content_writing (70%)
        let writing_stage = WritingStage::new(driver.clone());
        let mut content = writing_stage
            .generate_full_document(&outline, &research, *options.tone())
            .await?;
        job.checkpoint(JobStatus::Writing, "content_writing", 70)?;
        job.record_stage("content_writing", json!({ "words": content.word_count() }));
        self.jobs.put(job).await?;

        // statistics_extraction (80%)
        let statistics_stage = StatisticsStage::new(driver.clone());
        content.statistics = statistics_stage.extract_statistics(&content, &research).await;
        job.checkpoint(JobStatus::Writing, "statistics_extraction", 80)?;
        job.record_stage(
            "statistics_extraction",
            json!({ "statistics": content.statistics.len() }),
        );
        self.jobs.put(job).await?;

        // chart_generation (90%)
        let suggestions = suggest_visualizations(&content.statistics);
        content.charts = self
            .charts
            .render_suggestions(&suggestions, &ChartStyle::default());
        job.checkpoint(JobStatus::Rendering, "chart_generation", 90)?;
        job.record_stage(
            "chart_generation",
            json!({
                "suggestions": suggestions.len(),
                "rendered": content.charts.len(),
            }),
        );
        self.jobs.put(job).await?;

        // pdf_rendering (95%)
        let (pdf_bytes, page_count) = self.composer.render_pdf(
            &content,
            options.template_id().as_deref(),
            options.branding(),
        )?;
        let filename = format!("{}.pdf", document.id);
        let pdf_location = self
            .sink
            .save(&pdf_bytes, self.config.pdf_folder(), &filename)
            .await?;
        job.checkpoint(JobStatus::Rendering, "pdf_rendering", 95)?;
        job.record_stage(
            "pdf_rendering",
            json!({
                "location": pdf_location,
                "pages": page_count,
                "bytes": pdf_bytes.len(),
            }),
        );
        self.jobs.put(job).await?;

        Ok(PipelineOutput {
            content,
            pdf_location,
            page_count,
            sources_count: research.recommended_sources.len() as u32,
        })
    }
}

/// Machine-readable code for a failure, derived from the error domain.
fn error_code(error: &FolioError) -> &'static str {
    match error.kind() {
        FolioErrorKind::Models(_) | FolioErrorKind::Http(_) => "llm_error",
        FolioErrorKind::Render(_) => "render_error",
        FolioErrorKind::Chart(_) => "chart_error",
        FolioErrorKind::Storage(_) => "storage_error",
        FolioErrorKind::Pipeline(_) => "pipeline_error",
        _ => "internal_error",
    }
}
