//! Pipeline and job state machine error types.

/// Specific error conditions for pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Job record not found in the job store
    #[display("Job '{}' not found", _0)]
    JobNotFound(String),

    /// Document record not found in the document store
    #[display("Document '{}' not found", _0)]
    DocumentNotFound(String),

    /// A document already has a non-terminal generation job
    #[display("Document '{}' already has an active generation job", _0)]
    ActiveJobExists(String),

    /// Requested state transition is not allowed
    #[display("Invalid transition from '{}' via '{}'", from, action)]
    InvalidTransition {
        /// Current job status
        from: String,
        /// Attempted action
        action: String,
    },

    /// Retry requested past the maximum retry count
    #[display("Maximum retries ({}) exceeded", _0)]
    RetryLimitExceeded(u32),

    /// Progress would regress within one attempt
    #[display("Progress would regress from {}% to {}%", from, to)]
    ProgressRegression {
        /// Committed progress
        from: u8,
        /// Attempted progress
        to: u8,
    },

    /// A pipeline stage failed
    #[display("Stage '{}' failed: {}", stage, message)]
    StageFailed {
        /// Stage name
        stage: String,
        /// Failure description
        message: String,
    },

    /// Task queue rejected or lost the job
    #[display("Task queue error: {}", _0)]
    Queue(String),

    /// Pipeline configuration error
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use folio_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::RetryLimitExceeded(3));
/// assert!(format!("{}", err).contains("Maximum retries"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
