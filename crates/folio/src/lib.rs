//! Folio: an AI content pipeline that turns a topic into a branded
//! thought-leadership PDF.
//!
//! This facade re-exports the workspace crates. A typical embedding wires
//! the pieces like this:
//!
//! ```no_run
//! use folio::pipeline::{GenerationOrchestrator, JobService, PipelineConfig, TokioTaskQueue};
//! use folio::models::AnthropicClient;
//! use folio::storage::{FileSystemSink, MemoryDocumentStore, MemoryJobStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! folio::core::init_telemetry()?;
//! let config = PipelineConfig::load()?;
//!
//! let jobs = Arc::new(MemoryJobStore::new());
//! let documents = Arc::new(MemoryDocumentStore::new());
//! let sink = Arc::new(FileSystemSink::new(config.storage_root())?);
//! let driver = Arc::new(AnthropicClient::from_env()?);
//!
//! let orchestrator = Arc::new(GenerationOrchestrator::new(
//!     driver,
//!     jobs.clone(),
//!     documents.clone(),
//!     sink,
//!     config,
//! ));
//! let queue = Arc::new(TokioTaskQueue::new(orchestrator, jobs.clone()));
//! let service = JobService::new(jobs, documents, queue);
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use folio_charts as charts;
pub use folio_core as core;
pub use folio_error as error;
pub use folio_interface as interface;
pub use folio_models as models;
pub use folio_pipeline as pipeline;
pub use folio_render as render;
pub use folio_storage as storage;
