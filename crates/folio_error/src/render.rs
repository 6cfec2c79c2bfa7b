//! Document rendering error types.

/// Specific error conditions for PDF composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// Invalid branding value (e.g. unparseable color)
    #[display("Invalid branding value for '{}': {}", field, value)]
    InvalidBranding {
        /// Branding field name
        field: String,
        /// Offending value
        value: String,
    },

    /// Chart bytes could not be embedded
    #[display("Failed to embed chart image: {}", _0)]
    ImageEmbed(String),

    /// PDF serialization failed
    #[display("Failed to serialize PDF: {}", _0)]
    PdfWrite(String),
}

/// Rendering error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error condition
    pub kind: RenderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new RenderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
