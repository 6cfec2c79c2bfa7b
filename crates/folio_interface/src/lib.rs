//! Capability traits and collaborator records for the Folio pipeline.
//!
//! This crate defines the seams between the generation pipeline and its
//! collaborators: the LLM completion driver, the job and document stores,
//! the storage sink for rendered artifacts, and the task queue. The pipeline
//! depends only on these traits; concrete implementations live in
//! `folio_models` and `folio_storage` (and in application code).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod job;
mod stage_log;
mod stores;
mod traits;

pub use document::{Document, DocumentStatus};
pub use job::{GenerationJob, JobStatus, MAX_RETRIES};
pub use stage_log::{StageLog, StageRecord};
pub use stores::{DocumentStore, JobStore, StorageSink, TaskQueue};
pub use traits::FolioDriver;
