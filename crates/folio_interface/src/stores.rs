//! Collaborator traits consumed by the pipeline.
//!
//! The full persistence and queue surfaces live outside this workspace;
//! these traits are the narrow contracts the orchestrator needs. Reference
//! implementations are provided by `folio_storage` and by the in-process
//! queue in `folio_pipeline`.

use crate::{Document, GenerationJob};
use async_trait::async_trait;
use folio_error::FolioResult;
use uuid::Uuid;

/// Read/write access to generation job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job record.
    ///
    /// # Errors
    ///
    /// Returns `ActiveJobExists` if the document already has a job in a
    /// non-terminal state; at most one active job per document is allowed.
    async fn create(&self, job: &GenerationJob) -> FolioResult<()>;

    /// Fetch a job by id.
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` if no such record exists.
    async fn get(&self, job_id: Uuid) -> FolioResult<GenerationJob>;

    /// Most recent job for a document, if any.
    async fn get_by_document(&self, document_id: Uuid) -> FolioResult<Option<GenerationJob>>;

    /// Persist the full job record.
    ///
    /// Called after every progress commit so polling observers see live
    /// state; implementations must apply the update atomically. A stored
    /// terminal record is final: implementations reject an update that would
    /// move it back to a non-terminal status, except the bounded retry reset
    /// (failed to pending with an incremented `retry_count`).
    async fn put(&self, job: &GenerationJob) -> FolioResult<()>;

    /// Atomically set the external task handle on a stored job.
    ///
    /// A field-level update so the enqueue path never clobbers concurrent
    /// worker progress.
    async fn set_task_handle(&self, job_id: Uuid, handle: &str) -> FolioResult<()>;

    /// All jobs currently in an active (non-terminal, non-pending) status.
    ///
    /// Used by the stuck-job sweeper.
    async fn active_jobs(&self) -> FolioResult<Vec<GenerationJob>>;
}

/// Read/write access to document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if no such record exists.
    async fn get(&self, document_id: Uuid) -> FolioResult<Document>;

    /// Persist the full document record atomically.
    async fn put(&self, document: &Document) -> FolioResult<()>;
}

/// Sink for rendered artifacts (the generated PDF).
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Store bytes under a folder/filename and return an opaque locator.
    async fn save(&self, bytes: &[u8], folder: &str, filename: &str) -> FolioResult<String>;

    /// Fetch previously stored bytes by locator.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the locator does not resolve.
    async fn get(&self, locator: &str) -> FolioResult<Vec<u8>>;
}

/// Asynchronous task queue that invokes the pipeline worker.
///
/// Dispatch is at-least-once; the worker entry point is idempotent against
/// redelivery.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a generation run for a job; returns a cancelable task handle.
    async fn enqueue(&self, job_id: Uuid) -> FolioResult<String>;

    /// Signal the task behind a handle to terminate (best effort).
    async fn cancel(&self, handle: &str) -> FolioResult<()>;
}
