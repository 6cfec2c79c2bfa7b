//! External control surface for generation jobs: request, cancel, retry.

use folio_error::FolioResult;
use folio_interface::{DocumentStore, GenerationJob, JobStore, TaskQueue};
use std::sync::Arc;
use uuid::Uuid;

/// Job lifecycle operations exposed to the embedding application.
///
/// The state machine itself lives on [`GenerationJob`]; this service wires
/// it to the stores and the task queue.
pub struct JobService {
    jobs: Arc<dyn JobStore>,
    documents: Arc<dyn DocumentStore>,
    queue: Arc<dyn TaskQueue>,
}

impl JobService {
    /// Create the service over its collaborators.
    pub fn new(
        jobs: Arc<dyn JobStore>,
        documents: Arc<dyn DocumentStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            jobs,
            documents,
            queue,
        }
    }

    /// Request generation for a document.
    ///
    /// Creates a pending job (the store enforces at most one non-terminal
    /// job per document) and enqueues the pipeline run.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, `ActiveJobExists`, or a queue error.
    #[tracing::instrument(skip(self), fields(document_id = %document_id))]
    pub async fn request_generation(&self, document_id: Uuid) -> FolioResult<GenerationJob> {
        // Fail fast when the document is missing
        let document = self.documents.get(document_id).await?;

        let job = GenerationJob::new(document.id);
        self.jobs.create(&job).await?;

        let handle = self.queue.enqueue(*job.id()).await?;
        tracing::info!(job_id = %job.id(), handle = %handle, "Generation enqueued");

        self.jobs.get(*job.id()).await
    }

    /// Cancel a job.
    ///
    /// Allowed only while the job is non-terminal. The queued task is
    /// signaled best-effort; a stage already in flight may still finish its
    /// LLM call before the worker stops. The document keeps whatever status
    /// the last completed stage set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when the job is already terminal.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn cancel(&self, job_id: Uuid) -> FolioResult<GenerationJob> {
        let mut job = self.jobs.get(job_id).await?;
        job.cancel()?;
        self.jobs.put(&job).await?;

        if let Some(handle) = job.task_handle() {
            if let Err(e) = self.queue.cancel(handle).await {
                tracing::warn!(error = %e, "Task cancel signal failed; job is already terminal");
            }
        }

        tracing::info!("Job canceled");
        Ok(job)
    }

    /// Retry a failed job.
    ///
    /// Bounded by the maximum retry count; resets progress and error fields
    /// and re-enqueues a fresh run from the first stage (there is no
    /// resumption from the failed stage).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the job is failed, and
    /// `RetryLimitExceeded` once the retry budget is spent; in both cases
    /// nothing is re-enqueued.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn retry(&self, job_id: Uuid) -> FolioResult<GenerationJob> {
        let mut job = self.jobs.get(job_id).await?;
        job.reset_for_retry()?;
        self.jobs.put(&job).await?;

        let handle = self.queue.enqueue(*job.id()).await?;
        tracing::info!(retry = job.retry_count(), handle = %handle, "Retry enqueued");

        self.jobs.get(*job.id()).await
    }
}
