//! Pipeline configuration.

use folio_error::{ConfigError, FolioResult};
use serde::Deserialize;

/// Configuration for the generation pipeline.
///
/// Loaded from an optional `folio.toml` plus `FOLIO_`-prefixed environment
/// variables; every field has a working default.
///
/// # Examples
///
/// ```
/// use folio_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.pdf_folder(), "documents");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model override passed to the driver; `None` uses the driver default
    model: Option<String>,
    /// USD per million prompt tokens, for job cost accounting
    prompt_price_per_million: f64,
    /// USD per million completion tokens
    completion_price_per_million: f64,
    /// Root directory for the filesystem storage sink
    storage_root: String,
    /// Folder within the sink for rendered PDFs
    pdf_folder: String,
    /// Active jobs whose last update is older than this are swept to failed
    stuck_job_timeout_secs: u64,
    /// How often the stuck-job sweeper runs
    sweep_interval_secs: u64,
    /// Explicit font file for chart labels
    chart_font_path: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            prompt_price_per_million: 3.0,
            completion_price_per_million: 15.0,
            storage_root: "./data".to_string(),
            pdf_folder: "documents".to_string(),
            stuck_job_timeout_secs: 1800,
            sweep_interval_secs: 300,
            chart_font_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `folio.toml` (optional) and the environment.
    ///
    /// A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns a config error when a source exists but fails to parse.
    pub fn load() -> FolioResult<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("folio").required(false))
            .add_source(config::Environment::with_prefix("FOLIO"))
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))?;

        let config: PipelineConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        Ok(config)
    }
}
