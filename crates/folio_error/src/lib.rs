//! Error types for the Folio content generation pipeline.
//!
//! This crate provides the foundation error types used throughout the Folio workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use folio_error::{FolioResult, HttpError};
//!
//! fn fetch_data() -> FolioResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
mod json;
mod config;
mod backend;
mod builder;
mod models;
mod pipeline;
mod chart;
mod render;
mod storage;
mod error;

pub use http::HttpError;
pub use json::JsonError;
pub use config::ConfigError;
pub use backend::BackendError;
pub use builder::{BuilderError, BuilderErrorKind};
pub use models::{ModelsError, ModelsErrorKind, ModelsResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use chart::{ChartError, ChartErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use error::{FolioError, FolioErrorKind, FolioResult};
