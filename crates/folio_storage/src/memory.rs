//! In-memory store implementations.
//!
//! Back tests and single-process deployments. Both stores apply whole-record
//! updates under a write lock, giving observers the atomic-update behavior
//! the store contracts require.

use async_trait::async_trait;
use folio_error::{FolioResult, PipelineError, PipelineErrorKind};
use folio_interface::{Document, DocumentStore, GenerationJob, JobStatus, JobStore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory job store.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, GenerationJob>>,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &GenerationJob) -> FolioResult<()> {
        let mut jobs = self.jobs.write().await;
        let has_active = jobs
            .values()
            .any(|j| j.document_id() == job.document_id() && !j.status().is_terminal());
        if has_active {
            return Err(PipelineError::new(PipelineErrorKind::ActiveJobExists(
                job.document_id().to_string(),
            ))
            .into());
        }
        jobs.insert(*job.id(), job.clone());
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> FolioResult<GenerationJob> {
        self.jobs.read().await.get(&job_id).cloned().ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::JobNotFound(job_id.to_string())).into()
        })
    }

    async fn get_by_document(&self, document_id: Uuid) -> FolioResult<Option<GenerationJob>> {
        let jobs = self.jobs.read().await;
        let latest = jobs
            .values()
            .filter(|j| *j.document_id() == document_id)
            .max_by_key(|j| *j.created_at())
            .cloned();
        Ok(latest)
    }

    async fn put(&self, job: &GenerationJob) -> FolioResult<()> {
        let mut jobs = self.jobs.write().await;
        if let Some(existing) = jobs.get(job.id()) {
            // Terminal records are final; the one exception is the bounded
            // retry reset, recognizable by its incremented retry_count.
            let is_retry_reset = *existing.status() == JobStatus::Failed
                && *job.status() == JobStatus::Pending
                && job.retry_count() > existing.retry_count();
            let regressing = existing.status().is_terminal()
                && job.status() != existing.status()
                && !is_retry_reset;
            if regressing {
                return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                    from: existing.status().to_string(),
                    action: format!("put {}", job.status()),
                })
                .into());
            }
        }
        jobs.insert(*job.id(), job.clone());
        Ok(())
    }

    async fn set_task_handle(&self, job_id: Uuid, handle: &str) -> FolioResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&job_id).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::JobNotFound(job_id.to_string()))
        })?;
        job.set_task_handle(handle);
        Ok(())
    }

    async fn active_jobs(&self) -> FolioResult<Vec<GenerationJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .values()
            .filter(|j| j.status().is_active())
            .cloned()
            .collect())
    }
}

/// In-memory document store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, document_id: Uuid) -> FolioResult<Document> {
        self.documents
            .read()
            .await
            .get(&document_id)
            .cloned()
            .ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::DocumentNotFound(document_id.to_string()))
                    .into()
            })
    }

    async fn put(&self, document: &Document) -> FolioResult<()> {
        self.documents
            .write()
            .await
            .insert(document.id, document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::GenerationOptions;

    #[tokio::test]
    async fn test_create_rejects_second_active_job() {
        let store = MemoryJobStore::new();
        let document_id = Uuid::new_v4();

        let first = GenerationJob::new(document_id);
        store.create(&first).await.unwrap();

        let second = GenerationJob::new(document_id);
        assert!(store.create(&second).await.is_err());
    }

    #[tokio::test]
    async fn test_create_allows_new_job_after_terminal() {
        let store = MemoryJobStore::new();
        let document_id = Uuid::new_v4();

        let mut first = GenerationJob::new(document_id);
        store.create(&first).await.unwrap();
        first.start().unwrap();
        first.cancel().unwrap();
        store.put(&first).await.unwrap();

        let second = GenerationJob::new(document_id);
        store.create(&second).await.unwrap();
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = MemoryDocumentStore::new();
        let document = Document::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Future of Remote Work",
            "remote work",
            GenerationOptions::default(),
        );
        store.put(&document).await.unwrap();

        let fetched = store.get(document.id).await.unwrap();
        assert_eq!(fetched.slug, "future-of-remote-work");
    }
}
