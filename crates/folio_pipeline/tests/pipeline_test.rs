//! End-to-end pipeline tests against a scripted driver.

use async_trait::async_trait;
use folio_core::{
    GenerateRequest, GenerateResponse, GenerationOptions, Input, Output, ResearchDepth, TokenUsage,
    Tone,
};
use folio_error::{FolioResult, ModelsError, ModelsErrorKind};
use folio_interface::{
    Document, DocumentStatus, DocumentStore, FolioDriver, GenerationJob, JobStatus, JobStore,
    StorageSink, TaskQueue,
};
use folio_pipeline::{GenerationOrchestrator, JobService, PipelineConfig, TokioTaskQueue};
use folio_storage::{FileSystemSink, MemoryDocumentStore, MemoryJobStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Responds per stage by matching on prompt text, the way the real models
/// are prompted.
struct ScriptedDriver;

const RESEARCH_JSON: &str = r#"{
  "key_findings": ["Hybrid schedules are now the default", "Office footprints keep shrinking"],
  "statistics": [
    {"value": "73%", "context": "of employers plan to keep hybrid schedules", "source": "Workforce Survey", "category": "adoption", "highlight_worthy": true, "visualization_type": "percentage"},
    {"value": "21%", "context": "of roles are now fully remote", "category": "adoption", "highlight_worthy": false, "visualization_type": "percentage"},
    {"value": "44%", "context": "of managers report higher output", "category": "adoption", "highlight_worthy": false, "visualization_type": "percentage"}
  ],
  "trends": ["Async-first collaboration"],
  "challenges": ["Mentorship at a distance"],
  "opportunities": ["Global hiring"],
  "expert_perspectives": ["Remote is a management problem, not a technology problem"],
  "recommended_sources": ["Workforce Survey 2026", "Remote Index Q2"]
}"#;

const OUTLINE_JSON: &str = r#"{
  "title": "The Future of Remote Work",
  "subtitle": "From experiment to operating model",
  "executive_summary": {"key_points": ["Adoption is durable", "Management practices lag"], "word_count": 220},
  "sections": [
    {"id": "section-1", "title": "The State of Remote Work", "purpose": "Ground the reader in adoption data", "word_count": 400},
    {"title": "Building the Remote Operating Model", "purpose": "Practices that scale", "word_count": 500,
     "subsections": [
       {"title": "Asynchronous Rituals", "key_points": ["Meeting diets", "Written memos"], "word_count": 250, "include_statistics": true, "include_chart": false},
       {"title": "Measuring Output", "key_points": ["Outcome metrics"], "word_count": 250, "include_statistics": false, "include_chart": true}
     ]}
  ],
  "conclusion": {"key_points": ["Commit to the model"], "word_count": 260}
}"#;

const STATISTICS_JSON: &str = r#"{
  "statistics": [
    {"value": "73%", "context": "of employers plan to keep hybrid schedules", "source": "Workforce Survey", "category": "adoption", "highlight_worthy": true, "visualization_type": "percentage"},
    {"value": "21%", "context": "of roles are now fully remote", "category": "adoption", "highlight_worthy": false, "visualization_type": "percentage"},
    {"value": "44%", "context": "of managers report higher output", "category": "adoption", "highlight_worthy": false, "visualization_type": "percentage"},
    {"value": "$12 billion", "context": "saved annually on office space", "category": "cost", "highlight_worthy": true, "visualization_type": "currency"}
  ]
}"#;

fn scripted_response(prompt: &str) -> String {
    if prompt.contains("Extract 5-15 quantitative statistics") {
        STATISTICS_JSON.to_string()
    } else if prompt.contains("You are a research analyst") {
        format!("Here is the research you asked for:\n{}", RESEARCH_JSON)
    } else if prompt.contains("Plan a long-form thought-leadership document") {
        format!("```json\nignored preamble\n```\n{}", OUTLINE_JSON)
    } else if prompt.contains("Write the executive summary") {
        "Remote work moved from emergency measure to operating model. \
         This report maps what changed and what durable advantage looks like."
            .to_string()
    } else if prompt.contains("Write the conclusion") {
        "The organizations that treat remote work as a designed system keep compounding \
         their advantage.\n\nTalk to our team about designing yours."
            .to_string()
    } else {
        "Teams that invested in written culture found that 73% of their coordination \
         overhead disappeared. The rest of this section walks through how."
            .to_string()
    }
}

#[async_trait]
impl FolioDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> FolioResult<GenerateResponse> {
        let prompt = req
            .messages
            .iter()
            .flat_map(|m| m.content.iter())
            .map(|input| match input {
                Input::Text(text) => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(GenerateResponse {
            outputs: vec![Output::Text(scripted_response(&prompt))],
            usage: Some(TokenUsage::new(120, 340)),
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Fails every call, to drive the failure boundary.
struct DownDriver;

#[async_trait]
impl FolioDriver for DownDriver {
    async fn generate(&self, _req: &GenerateRequest) -> FolioResult<GenerateResponse> {
        Err(ModelsError::new(ModelsErrorKind::Http("connection refused".to_string())).into())
    }

    fn provider_name(&self) -> &'static str {
        "down"
    }

    fn model_name(&self) -> &str {
        "down-1"
    }
}

/// Job store decorator that records every committed snapshot.
struct RecordingJobStore {
    inner: MemoryJobStore,
    commits: Mutex<Vec<(u8, Option<String>, JobStatus)>>,
}

impl RecordingJobStore {
    fn new() -> Self {
        Self {
            inner: MemoryJobStore::new(),
            commits: Mutex::new(Vec::new()),
        }
    }

    fn progress_commits(&self) -> Vec<u8> {
        self.commits.lock().unwrap().iter().map(|(p, _, _)| *p).collect()
    }

    fn step_commits(&self) -> Vec<String> {
        self.commits
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, step, _)| step.clone())
            .collect()
    }
}

#[async_trait]
impl JobStore for RecordingJobStore {
    async fn create(&self, job: &GenerationJob) -> FolioResult<()> {
        self.inner.create(job).await
    }

    async fn get(&self, job_id: Uuid) -> FolioResult<GenerationJob> {
        self.inner.get(job_id).await
    }

    async fn get_by_document(&self, document_id: Uuid) -> FolioResult<Option<GenerationJob>> {
        self.inner.get_by_document(document_id).await
    }

    async fn put(&self, job: &GenerationJob) -> FolioResult<()> {
        self.inner.put(job).await?;
        self.commits.lock().unwrap().push((
            *job.progress_percent(),
            job.current_step().clone(),
            *job.status(),
        ));
        Ok(())
    }

    async fn set_task_handle(&self, job_id: Uuid, handle: &str) -> FolioResult<()> {
        self.inner.set_task_handle(job_id, handle).await
    }

    async fn active_jobs(&self) -> FolioResult<Vec<GenerationJob>> {
        self.inner.active_jobs().await
    }
}

/// Queue stub for control-surface tests: records calls, runs nothing.
struct StubQueue {
    jobs: Arc<dyn JobStore>,
    enqueued: Mutex<Vec<Uuid>>,
    canceled: Mutex<Vec<String>>,
}

impl StubQueue {
    fn new(jobs: Arc<dyn JobStore>) -> Self {
        Self {
            jobs,
            enqueued: Mutex::new(Vec::new()),
            canceled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TaskQueue for StubQueue {
    async fn enqueue(&self, job_id: Uuid) -> FolioResult<String> {
        let handle = Uuid::new_v4().to_string();
        self.jobs.set_task_handle(job_id, &handle).await?;
        self.enqueued.lock().unwrap().push(job_id);
        Ok(handle)
    }

    async fn cancel(&self, handle: &str) -> FolioResult<()> {
        self.canceled.lock().unwrap().push(handle.to_string());
        Ok(())
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("folio-pipeline-{}-{}", tag, Uuid::new_v4()))
}

fn draft_document() -> Document {
    let options = GenerationOptions::builder()
        .tone(Tone::Conversational)
        .keywords(vec!["remote".to_string(), "hybrid".to_string()])
        .depth(ResearchDepth::Standard)
        .build()
        .unwrap();
    Document::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Future of Remote Work",
        "Future of Remote Work",
        options,
    )
}

struct Harness {
    jobs: Arc<RecordingJobStore>,
    documents: Arc<MemoryDocumentStore>,
    sink: Arc<FileSystemSink>,
    orchestrator: GenerationOrchestrator,
}

fn harness(driver: Arc<dyn FolioDriver>, tag: &str) -> Harness {
    let jobs = Arc::new(RecordingJobStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let sink = Arc::new(FileSystemSink::new(temp_dir(tag)).unwrap());
    let orchestrator = GenerationOrchestrator::new(
        driver,
        jobs.clone(),
        documents.clone(),
        sink.clone(),
        PipelineConfig::default(),
    );
    Harness {
        jobs,
        documents,
        sink,
        orchestrator,
    }
}

#[tokio::test]
async fn test_full_pipeline_produces_ready_document_with_pdf() {
    let h = harness(Arc::new(ScriptedDriver), "e2e");

    let document = draft_document();
    h.documents.put(&document).await.unwrap();
    let job = GenerationJob::new(document.id);
    h.jobs.create(&job).await.unwrap();

    h.orchestrator.run(*job.id()).await.unwrap();

    let finished = h.jobs.get(*job.id()).await.unwrap();
    assert_eq!(*finished.status(), JobStatus::Completed);
    assert_eq!(*finished.progress_percent(), 100);
    assert!(*finished.tokens_used() > 0);
    assert!(*finished.api_cost() > 0.0);
    assert!(finished.error_message().is_none());

    let updated = h.documents.get(document.id).await.unwrap();
    assert_eq!(updated.status, DocumentStatus::Ready);
    let content = updated.content.expect("content written on completion");
    // One call per content unit, assembled in outline order
    assert_eq!(content.sections.len(), 2);
    assert_eq!(content.sections[1].subsections.len(), 2);
    assert!(!content.statistics.is_empty());
    assert_eq!(updated.word_count, Some(content.word_count() as u32));
    assert_eq!(updated.sources_count, Some(2));

    let locator = updated.pdf_location.expect("pdf stored");
    let pdf = h.sink.get(&locator).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert!(updated.page_count.unwrap() >= 1);
}

#[tokio::test]
async fn test_progress_commits_are_monotonic_and_steps_ordered() {
    let h = harness(Arc::new(ScriptedDriver), "progress");

    let document = draft_document();
    h.documents.put(&document).await.unwrap();
    let job = GenerationJob::new(document.id);
    h.jobs.create(&job).await.unwrap();

    h.orchestrator.run(*job.id()).await.unwrap();

    let commits = h.jobs.progress_commits();
    let mut checkpoints = Vec::new();
    for value in commits {
        if checkpoints.last() != Some(&value) {
            checkpoints.push(value);
        }
    }
    assert!(checkpoints.windows(2).all(|w| w[0] < w[1]), "{:?}", checkpoints);
    assert_eq!(checkpoints.last(), Some(&100));

    let mut steps = Vec::new();
    for step in h.jobs.step_commits() {
        if steps.last() != Some(&step) {
            steps.push(step);
        }
    }
    assert_eq!(
        steps,
        vec![
            "topic_analysis",
            "keyword_research",
            "web_research",
            "industry_analysis",
            "outline_generation",
            "content_writing",
            "statistics_extraction",
            "chart_generation",
            "pdf_rendering",
            "completed",
        ]
    );
}

#[tokio::test]
async fn test_stage_records_accumulate_in_order() {
    let h = harness(Arc::new(ScriptedDriver), "stages");

    let document = draft_document();
    h.documents.put(&document).await.unwrap();
    let job = GenerationJob::new(document.id);
    h.jobs.create(&job).await.unwrap();

    h.orchestrator.run(*job.id()).await.unwrap();

    let finished = h.jobs.get(*job.id()).await.unwrap();
    let stages: Vec<&str> = finished.stages().iter().map(|r| r.stage.as_str()).collect();
    assert_eq!(
        stages,
        vec![
            "topic_analysis",
            "keyword_research",
            "web_research",
            "industry_analysis",
            "outline_generation",
            "content_writing",
            "statistics_extraction",
            "chart_generation",
            "pdf_rendering",
        ]
    );
    // The outline is embedded in the stage log, its only persisted home
    let outline_record = finished.stages().get("outline_generation").unwrap();
    assert_eq!(outline_record.summary["sections"], 2);
    assert!(outline_record.summary["outline"].is_object());
}

#[tokio::test]
async fn test_driver_failure_marks_job_and_document_failed() {
    let h = harness(Arc::new(DownDriver), "failure");

    let document = draft_document();
    h.documents.put(&document).await.unwrap();
    let job = GenerationJob::new(document.id);
    h.jobs.create(&job).await.unwrap();

    h.orchestrator.run(*job.id()).await.unwrap();

    let failed = h.jobs.get(*job.id()).await.unwrap();
    assert_eq!(*failed.status(), JobStatus::Failed);
    assert!(failed.error_message().as_deref().unwrap().contains("connection refused"));
    assert_eq!(failed.error_code().as_deref(), Some("llm_error"));

    let updated = h.documents.get(document.id).await.unwrap();
    assert_eq!(updated.status, DocumentStatus::Failed);
    // No partial content on failure
    assert!(updated.content.is_none());
    assert!(updated.pdf_location.is_none());
}

#[tokio::test]
async fn test_completed_job_is_not_rerun_on_redelivery() {
    let h = harness(Arc::new(ScriptedDriver), "redelivery");

    let document = draft_document();
    h.documents.put(&document).await.unwrap();
    let job = GenerationJob::new(document.id);
    h.jobs.create(&job).await.unwrap();

    h.orchestrator.run(*job.id()).await.unwrap();
    let commits_after_first = h.jobs.progress_commits().len();

    // The queue may redeliver; the worker must not run the pipeline again
    h.orchestrator.run(*job.id()).await.unwrap();
    assert_eq!(h.jobs.progress_commits().len(), commits_after_first);
    let finished = h.jobs.get(*job.id()).await.unwrap();
    assert_eq!(*finished.status(), JobStatus::Completed);
}

#[tokio::test]
async fn test_job_service_cancel_and_guards() {
    let jobs: Arc<RecordingJobStore> = Arc::new(RecordingJobStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let queue = Arc::new(StubQueue::new(jobs.clone()));
    let service = JobService::new(jobs.clone(), documents.clone(), queue.clone());

    let document = draft_document();
    documents.put(&document).await.unwrap();

    let job = service.request_generation(document.id).await.unwrap();
    assert!(job.task_handle().is_some());
    assert_eq!(queue.enqueued.lock().unwrap().len(), 1);

    // Second request while a job is active is rejected
    assert!(service.request_generation(document.id).await.is_err());

    // Simulate the worker picking the job up
    let mut running = jobs.get(*job.id()).await.unwrap();
    running.start().unwrap();
    jobs.put(&running).await.unwrap();

    let canceled = service.cancel(*job.id()).await.unwrap();
    assert_eq!(*canceled.status(), JobStatus::Canceled);
    assert_eq!(queue.canceled.lock().unwrap().len(), 1);

    // Canceling a terminal job is rejected
    assert!(service.cancel(*job.id()).await.is_err());
}

#[tokio::test]
async fn test_job_service_retry_bound() {
    let jobs: Arc<RecordingJobStore> = Arc::new(RecordingJobStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let queue = Arc::new(StubQueue::new(jobs.clone()));
    let service = JobService::new(jobs.clone(), documents.clone(), queue.clone());

    let document = draft_document();
    documents.put(&document).await.unwrap();
    let job = service.request_generation(document.id).await.unwrap();

    for attempt in 1..=3u32 {
        let mut failing = jobs.get(*job.id()).await.unwrap();
        failing.start().unwrap();
        failing.fail("model unavailable", None).unwrap();
        jobs.put(&failing).await.unwrap();

        let retried = service.retry(*job.id()).await.unwrap();
        assert_eq!(*retried.status(), JobStatus::Pending);
        assert_eq!(*retried.retry_count(), attempt);
    }

    let mut failing = jobs.get(*job.id()).await.unwrap();
    failing.start().unwrap();
    failing.fail("model unavailable", None).unwrap();
    jobs.put(&failing).await.unwrap();

    // Fourth retry exceeds the bound and is not re-enqueued
    let enqueued_before = queue.enqueued.lock().unwrap().len();
    assert!(service.retry(*job.id()).await.is_err());
    assert_eq!(queue.enqueued.lock().unwrap().len(), enqueued_before);
}

#[tokio::test]
async fn test_tokio_queue_runs_pipeline_to_completion() {
    let jobs = Arc::new(RecordingJobStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let sink = Arc::new(FileSystemSink::new(temp_dir("queue")).unwrap());
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        Arc::new(ScriptedDriver),
        jobs.clone(),
        documents.clone(),
        sink,
        PipelineConfig::default(),
    ));
    let queue = Arc::new(TokioTaskQueue::new(orchestrator, jobs.clone()));
    let service = JobService::new(jobs.clone(), documents.clone(), queue);

    let document = draft_document();
    documents.put(&document).await.unwrap();
    let job = service.request_generation(document.id).await.unwrap();

    let mut status = *job.status();
    for _ in 0..500 {
        status = *jobs.get(*job.id()).await.unwrap().status();
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(status, JobStatus::Completed);

    let updated = documents.get(document.id).await.unwrap();
    assert_eq!(updated.status, DocumentStatus::Ready);
}
