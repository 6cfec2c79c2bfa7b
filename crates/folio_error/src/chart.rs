//! Chart rendering error types.

/// Specific error conditions for chart rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ChartErrorKind {
    /// Labels and values have mismatched lengths
    #[display("Data mismatch: {} labels, {} values", labels, values)]
    DataMismatch {
        /// Number of labels supplied
        labels: usize,
        /// Number of values supplied
        values: usize,
    },

    /// PNG encoding failed
    #[display("Failed to encode chart image: {}", _0)]
    Encoding(String),

    /// Font could not be loaded for label drawing
    #[display("Failed to load font: {}", _0)]
    FontLoad(String),
}

/// Chart rendering error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Chart Error: {} at line {} in {}", kind, line, file)]
pub struct ChartError {
    /// The specific error condition
    pub kind: ChartErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ChartError {
    /// Create a new ChartError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ChartErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
