//! Stuck-job sweeper.
//!
//! The task queue's wall-clock limit can kill a worker without the
//! orchestrator marking its job terminal, leaving the job in its
//! last-persisted active state. The sweeper detects those jobs by stale
//! `updated_at` and fails them with error code `timeout`.

use crate::PipelineConfig;
use chrono::Utc;
use folio_error::FolioResult;
use folio_interface::{DocumentStatus, DocumentStore, JobStore};
use std::sync::Arc;

/// Periodically fails jobs stuck in an active status.
pub struct StuckJobSweeper {
    jobs: Arc<dyn JobStore>,
    documents: Arc<dyn DocumentStore>,
    timeout: chrono::Duration,
    interval: std::time::Duration,
}

impl StuckJobSweeper {
    /// Create a sweeper with timeouts from the pipeline configuration.
    pub fn new(
        jobs: Arc<dyn JobStore>,
        documents: Arc<dyn DocumentStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            jobs,
            documents,
            timeout: chrono::Duration::seconds(*config.stuck_job_timeout_secs() as i64),
            interval: std::time::Duration::from_secs(*config.sweep_interval_secs()),
        }
    }

    /// One sweep pass; returns the number of jobs failed.
    ///
    /// # Errors
    ///
    /// Returns store errors; individual job updates that race with a
    /// finishing worker are skipped, not errors.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_once(&self) -> FolioResult<usize> {
        let now = Utc::now();
        let mut swept = 0;

        for mut job in self.jobs.active_jobs().await? {
            if now - *job.updated_at() < self.timeout {
                continue;
            }
            tracing::warn!(
                job_id = %job.id(),
                status = %job.status(),
                step = ?job.current_step(),
                "Job exceeded the task timeout, marking failed"
            );

            if job
                .fail("generation exceeded the task timeout", Some("timeout".to_string()))
                .is_err()
            {
                continue;
            }
            if self.jobs.put(&job).await.is_err() {
                // The worker finished in between; leave its result alone
                continue;
            }

            if let Ok(mut document) = self.documents.get(*job.document_id()).await {
                document.status = DocumentStatus::Failed;
                document.updated_at = now;
                self.documents.put(&document).await?;
            }
            swept += 1;
        }

        if swept > 0 {
            tracing::info!(swept, "Stuck jobs failed");
        }
        Ok(swept)
    }

    /// Run sweeps forever at the configured interval.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep_once().await {
                tracing::error!(error = %e, "Sweep pass failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_interface::{GenerationJob, JobStatus};

    // A minimal job store for sweep tests lives in folio_storage; these
    // tests use it through the dev-dependency.
    use folio_storage::{MemoryDocumentStore, MemoryJobStore};
    use uuid::Uuid;

    fn sweeper_with(timeout_secs: u64) -> (StuckJobSweeper, Arc<MemoryJobStore>) {
        let jobs = Arc::new(MemoryJobStore::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        let config = PipelineConfig::default();
        let mut sweeper = StuckJobSweeper::new(jobs.clone(), documents, &config);
        sweeper.timeout = chrono::Duration::seconds(timeout_secs as i64);
        (sweeper, jobs)
    }

    #[tokio::test]
    async fn test_sweep_fails_stale_active_jobs() {
        let (sweeper, jobs) = sweeper_with(0);

        let mut job = GenerationJob::new(Uuid::new_v4());
        jobs.create(&job).await.unwrap();
        job.start().unwrap();
        jobs.put(&job).await.unwrap();

        let swept = sweeper.sweep_once().await.unwrap();
        assert_eq!(swept, 1);

        let swept_job = jobs.get(*job.id()).await.unwrap();
        assert_eq!(*swept_job.status(), JobStatus::Failed);
        assert_eq!(swept_job.error_code().as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_sweep_leaves_fresh_jobs_alone() {
        let (sweeper, jobs) = sweeper_with(3600);

        let mut job = GenerationJob::new(Uuid::new_v4());
        jobs.create(&job).await.unwrap();
        job.start().unwrap();
        jobs.put(&job).await.unwrap();

        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
        let untouched = jobs.get(*job.id()).await.unwrap();
        assert_eq!(*untouched.status(), JobStatus::Researching);
    }

    #[tokio::test]
    async fn test_sweep_ignores_pending_and_terminal_jobs() {
        let (sweeper, jobs) = sweeper_with(0);

        let pending = GenerationJob::new(Uuid::new_v4());
        jobs.create(&pending).await.unwrap();

        let mut done = GenerationJob::new(Uuid::new_v4());
        jobs.create(&done).await.unwrap();
        done.start().unwrap();
        done.complete().unwrap();
        jobs.put(&done).await.unwrap();

        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
    }
}
