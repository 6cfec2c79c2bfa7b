//! Core data types for the Folio content generation pipeline.
//!
//! This crate provides the foundation data types used across all Folio
//! interfaces: LLM request/response shapes, the versioned document content
//! contract, research and outline structures, and generation options.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content;
mod input;
mod media;
mod message;
mod options;
mod outline;
mod output;
mod request;
mod research;
mod role;
mod telemetry;
mod usage;
mod viz;

pub use content::{Chart, ChartType, Conclusion, DocumentContent, Section, Statistic, Subsection};
pub use input::Input;
pub use media::MediaSource;
pub use message::{Message, MessageBuilder, MessageBuilderError};
pub use options::{Branding, GenerationOptions, GenerationOptionsBuilder, ResearchDepth, Tone};
pub use outline::{ConclusionSpec, ExecutiveSummarySpec, Outline, OutlineSection, OutlineSubsection};
pub use output::Output;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateRequestBuilderError, GenerateResponse,
};
pub use research::{IndustryAnalysis, ResearchBundle};
pub use role::Role;
pub use telemetry::{init_telemetry, shutdown_telemetry};
pub use usage::TokenUsage;
pub use viz::{SuggestionKind, SuggestionPriority, VisualizationSuggestion};
