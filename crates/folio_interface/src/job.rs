//! Generation job record and its state machine.

use crate::StageLog;
use chrono::{DateTime, Utc};
use folio_error::{PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of retries for a failed job.
pub const MAX_RETRIES: u32 = 3;

/// Lifecycle states of a generation job.
///
/// `Pending → Researching → Writing → Rendering` and then exactly one of the
/// terminal states.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JobStatus {
    /// Created, waiting for a worker
    #[default]
    Pending,
    /// Research stages in flight
    Researching,
    /// Outline, writing and statistics stages in flight
    Writing,
    /// Chart and PDF stages in flight
    Rendering,
    /// Finished with a renderable PDF
    Completed,
    /// Finished with an error
    Failed,
    /// Aborted by an external cancel
    Canceled,
}

impl JobStatus {
    /// Whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }

    /// Whether a worker is (supposedly) executing the job.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Researching | JobStatus::Writing | JobStatus::Rendering
        )
    }
}

/// Tracks one attempt to generate a document.
///
/// All mutation goes through the methods below, which enforce the transition
/// rules: progress is strictly increasing within an attempt, terminal states
/// are final except for the bounded retry path, and the stage log only grows.
///
/// # Examples
///
/// ```
/// use folio_interface::{GenerationJob, JobStatus};
/// use uuid::Uuid;
///
/// let mut job = GenerationJob::new(Uuid::new_v4());
/// assert_eq!(*job.status(), JobStatus::Pending);
///
/// job.start().unwrap();
/// assert_eq!(*job.status(), JobStatus::Researching);
/// assert_eq!(*job.progress_percent(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GenerationJob {
    /// Job identity
    id: Uuid,
    /// Owning document
    document_id: Uuid,
    /// Lifecycle status
    status: JobStatus,
    /// Fine-grained step label within the current status
    current_step: Option<String>,
    /// Progress percentage, 0-100, strictly increasing within an attempt
    progress_percent: u8,
    /// Append-only per-stage results
    stages: StageLog,
    /// Failure description, set only on failure
    error_message: Option<String>,
    /// Machine-readable failure code, set only on failure
    error_code: Option<String>,
    /// Number of retries consumed
    retry_count: u32,
    /// Total tokens consumed across all LLM calls
    tokens_used: u64,
    /// Estimated API cost in USD
    api_cost: f64,
    /// Handle for canceling the queued task
    task_handle: Option<String>,
    /// When the record was created
    created_at: DateTime<Utc>,
    /// When a worker picked the job up
    started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    completed_at: Option<DateTime<Utc>>,
    /// Last mutation time; the stuck-job sweeper keys off this
    updated_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Create a pending job for a document.
    pub fn new(document_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document_id,
            status: JobStatus::Pending,
            current_step: None,
            progress_percent: 0,
            stages: StageLog::new(),
            error_message: None,
            error_code: None,
            retry_count: 0,
            tokens_used: 0,
            api_cost: 0.0,
            task_handle: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Attach the task queue handle used for cancellation.
    pub fn set_task_handle(&mut self, handle: impl Into<String>) {
        self.task_handle = Some(handle.into());
        self.touch();
    }

    /// Mark the job started: `Pending → Researching` at the first checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the job is not pending.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.status != JobStatus::Pending {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "start".to_string(),
            }));
        }
        self.status = JobStatus::Researching;
        self.current_step = Some("topic_analysis".to_string());
        self.progress_percent = 5;
        self.started_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Commit a progress checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `ProgressRegression` if `progress` does not advance, and
    /// `InvalidTransition` if the job is terminal.
    pub fn checkpoint(
        &mut self,
        status: JobStatus,
        step: impl Into<String>,
        progress: u8,
    ) -> Result<(), PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "checkpoint".to_string(),
            }));
        }
        if progress <= self.progress_percent {
            return Err(PipelineError::new(PipelineErrorKind::ProgressRegression {
                from: self.progress_percent,
                to: progress,
            }));
        }
        self.status = status;
        self.current_step = Some(step.into());
        self.progress_percent = progress;
        self.touch();
        Ok(())
    }

    /// Append a completed-stage record to the stage log.
    pub fn record_stage(&mut self, stage: impl Into<String>, summary: serde_json::Value) {
        self.stages.record(stage, summary);
        self.touch();
    }

    /// Accumulate token usage and API cost from one LLM call.
    pub fn add_usage(&mut self, tokens: u64, cost: f64) {
        self.tokens_used += tokens;
        self.api_cost += cost;
        self.touch();
    }

    /// Mark the job completed at 100%.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the job is already terminal.
    pub fn complete(&mut self) -> Result<(), PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "complete".to_string(),
            }));
        }
        self.status = JobStatus::Completed;
        self.current_step = Some("completed".to_string());
        self.progress_percent = 100;
        self.completed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Mark the job failed with an error description.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the job is already terminal.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        code: Option<String>,
    ) -> Result<(), PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "fail".to_string(),
            }));
        }
        self.status = JobStatus::Failed;
        self.error_message = Some(message.into());
        self.error_code = code;
        self.completed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Cancel the job.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the job is already terminal.
    pub fn cancel(&mut self) -> Result<(), PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "cancel".to_string(),
            }));
        }
        self.status = JobStatus::Canceled;
        self.completed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Reset a failed job for a fresh attempt from stage 1.
    ///
    /// Clears error fields, progress and timestamps, and consumes one retry.
    /// The stage log is retained: records from prior attempts stay visible.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the job is failed, and
    /// `RetryLimitExceeded` once `retry_count` reaches [`MAX_RETRIES`].
    pub fn reset_for_retry(&mut self) -> Result<(), PipelineError> {
        if self.status != JobStatus::Failed {
            return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                from: self.status.to_string(),
                action: "retry".to_string(),
            }));
        }
        if self.retry_count >= MAX_RETRIES {
            return Err(PipelineError::new(PipelineErrorKind::RetryLimitExceeded(
                MAX_RETRIES,
            )));
        }
        self.status = JobStatus::Pending;
        self.current_step = None;
        self.progress_percent = 0;
        self.error_message = None;
        self.error_code = None;
        self.retry_count += 1;
        self.started_at = None;
        self.completed_at = None;
        self.task_handle = None;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_error::PipelineErrorKind;

    #[test]
    fn test_start_requires_pending() {
        let mut job = GenerationJob::new(Uuid::new_v4());
        job.start().unwrap();
        assert!(job.start().is_err());
    }

    #[test]
    fn test_checkpoint_rejects_regression() {
        let mut job = GenerationJob::new(Uuid::new_v4());
        job.start().unwrap();
        job.checkpoint(JobStatus::Researching, "web_research", 25).unwrap();

        let err = job
            .checkpoint(JobStatus::Researching, "keyword_research", 10)
            .unwrap_err();
        assert!(matches!(
            err.kind,
            PipelineErrorKind::ProgressRegression { from: 25, to: 10 }
        ));
    }

    #[test]
    fn test_cancel_rejected_on_terminal_job() {
        let mut job = GenerationJob::new(Uuid::new_v4());
        job.start().unwrap();
        job.cancel().unwrap();
        assert_eq!(*job.status(), JobStatus::Canceled);
        assert!(job.cancel().is_err());
    }

    #[test]
    fn test_retry_bounded_at_max() {
        let mut job = GenerationJob::new(Uuid::new_v4());
        for _ in 0..MAX_RETRIES {
            job.start().unwrap();
            job.fail("boom", None).unwrap();
            job.reset_for_retry().unwrap();
        }
        job.start().unwrap();
        job.fail("boom", None).unwrap();

        let err = job.reset_for_retry().unwrap_err();
        assert!(matches!(
            err.kind,
            PipelineErrorKind::RetryLimitExceeded(3)
        ));
    }

    #[test]
    fn test_retry_clears_error_and_progress() {
        let mut job = GenerationJob::new(Uuid::new_v4());
        job.start().unwrap();
        job.checkpoint(JobStatus::Writing, "content_writing", 70).unwrap();
        job.fail("model unavailable", Some("llm_error".to_string())).unwrap();

        job.reset_for_retry().unwrap();
        assert_eq!(*job.status(), JobStatus::Pending);
        assert_eq!(*job.progress_percent(), 0);
        assert!(job.error_message().is_none());
        assert!(job.started_at().is_none());
        assert_eq!(*job.retry_count(), 1);
    }
}
