//! Model provider errors.

/// Model provider-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelsErrorKind {
    /// Request could not be delivered to the provider
    #[display("Request failed: {}", _0)]
    Http(String),

    /// Provider returned a non-success status
    #[display("API error (status {}): {}", status, message)]
    ApiError {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body or error description
        message: String,
    },

    /// Provider response could not be parsed
    #[display("Parse error: {}", _0)]
    Parse(String),

    /// Error converting between provider and Folio types
    #[display("Conversion error: {}", _0)]
    ConversionError(String),

    /// Missing or invalid provider configuration
    #[display("Configuration error: {}", _0)]
    Configuration(String),

    /// Builder error (derive_builder failures)
    #[display("Builder error: {}", _0)]
    Builder(String),
}

/// Model provider error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Result type for model operations.
pub type ModelsResult<T> = Result<T, ModelsError>;
