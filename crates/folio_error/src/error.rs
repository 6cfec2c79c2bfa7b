//! Top-level error wrapper types.

use crate::{
    BackendError, BuilderError, ChartError, ConfigError, HttpError, JsonError, ModelsError,
    PipelineError, RenderError, StorageError,
};

/// This is the foundation error enum for the Folio workspace. Each member
/// crate contributes a variant for its domain.
///
/// # Examples
///
/// ```
/// use folio_error::{FolioError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: FolioError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FolioErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Generic backend error
    #[from(BackendError)]
    Backend(BackendError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Model provider error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Pipeline / job state machine error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Chart rendering error
    #[from(ChartError)]
    Chart(ChartError),
    /// Document rendering error
    #[from(RenderError)]
    Render(RenderError),
    /// Storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Folio error with kind discrimination.
///
/// # Examples
///
/// ```
/// use folio_error::{FolioError, FolioResult, ConfigError};
///
/// fn might_fail() -> FolioResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Folio Error: {}", _0)]
pub struct FolioError(Box<FolioErrorKind>);

impl FolioError {
    /// Create a new error from a kind.
    pub fn new(kind: FolioErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FolioErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to FolioErrorKind
impl<T> From<T> for FolioError
where
    T: Into<FolioErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Folio operations.
///
/// # Examples
///
/// ```
/// use folio_error::{FolioResult, HttpError};
///
/// fn fetch_data() -> FolioResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type FolioResult<T> = std::result::Result<T, FolioError>;
