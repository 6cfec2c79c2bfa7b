//! In-process task queue backed by tokio tasks.
//!
//! Deployments with an external queue implement [`TaskQueue`] over it; this
//! implementation runs the orchestrator on the local runtime and supports
//! best-effort cancellation via task abort.

use crate::GenerationOrchestrator;
use async_trait::async_trait;
use folio_error::FolioResult;
use folio_interface::{JobStore, TaskQueue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Task queue that spawns one tokio task per generation run.
pub struct TokioTaskQueue {
    orchestrator: Arc<GenerationOrchestrator>,
    jobs: Arc<dyn JobStore>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioTaskQueue {
    /// Create a queue dispatching to the given orchestrator.
    pub fn new(orchestrator: Arc<GenerationOrchestrator>, jobs: Arc<dyn JobStore>) -> Self {
        Self {
            orchestrator,
            jobs,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn prune_finished(&self) {
        self.tasks
            .lock()
            .expect("task registry lock poisoned")
            .retain(|_, task| !task.is_finished());
    }
}

#[async_trait]
impl TaskQueue for TokioTaskQueue {
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    async fn enqueue(&self, job_id: Uuid) -> FolioResult<String> {
        self.prune_finished();

        let handle_id = Uuid::new_v4().to_string();
        // Persist the handle before the worker starts so its view of the
        // job already carries it.
        self.jobs.set_task_handle(job_id, &handle_id).await?;

        let orchestrator = self.orchestrator.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = orchestrator.run(job_id).await {
                tracing::error!(job_id = %job_id, error = %e, "Generation task failed");
            }
        });

        self.tasks
            .lock()
            .expect("task registry lock poisoned")
            .insert(handle_id.clone(), task);

        tracing::debug!(handle = %handle_id, "Task spawned");
        Ok(handle_id)
    }

    #[tracing::instrument(skip(self), fields(handle = %handle))]
    async fn cancel(&self, handle: &str) -> FolioResult<()> {
        let task = self
            .tasks
            .lock()
            .expect("task registry lock poisoned")
            .remove(handle);

        match task {
            Some(task) => {
                task.abort();
                tracing::info!("Task aborted");
            }
            None => {
                // Redelivered cancels and already-finished tasks land here
                tracing::warn!("Unknown task handle, nothing to abort");
            }
        }
        Ok(())
    }
}
