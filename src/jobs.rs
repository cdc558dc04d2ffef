//! Fire-and-forget job registry for async dispatch.
//!
//! Each transport session owns one [`AsyncJobs`]. The underlying task set is
//! created on first dispatch behind a [`OnceLock`], so concurrent callers that
//! enter async mode at the same time share a single set. Completion is only
//! observable through [`AsyncJobs::join_all`].

use std::future::Future;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::task::JoinSet;

use crate::error::{JiraError, Result};

/// Result of one dispatched job.
#[derive(Debug)]
pub struct JobOutcome {
    /// HTTP method of the job (`PUT`, `DELETE`).
    pub method: &'static str,
    /// Target URL.
    pub url: String,
    /// Final HTTP status, or the error that ended the job.
    pub result: Result<u16>,
}

impl JobOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Session-scoped set of in-flight async jobs.
#[derive(Debug, Default)]
pub struct AsyncJobs {
    tasks: OnceLock<Mutex<JoinSet<JobOutcome>>>,
}

impl AsyncJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `job` on the current tokio runtime and return immediately.
    pub fn dispatch<F>(&self, method: &'static str, url: String, job: F)
    where
        F: Future<Output = Result<u16>> + Send + 'static,
    {
        tracing::debug!(method, %url, "Dispatching async job");
        let mut tasks = self.lock_tasks();
        tasks.spawn(async move {
            let result = job.await;
            if let Err(ref e) = result {
                tracing::warn!(method, %url, error = %e, "Async job failed");
            }
            JobOutcome {
                method,
                url,
                result,
            }
        });
    }

    /// Number of jobs dispatched and not yet joined.
    pub fn pending(&self) -> usize {
        self.tasks
            .get()
            .map(|tasks| tasks.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    /// Whether any job was ever dispatched on this session.
    pub fn is_initialized(&self) -> bool {
        self.tasks.get().is_some()
    }

    /// Wait for every pending job and return their outcomes.
    ///
    /// Jobs dispatched while the join is running are left for the next call.
    pub async fn join_all(&self) -> Vec<JobOutcome> {
        let Some(tasks) = self.tasks.get() else {
            return Vec::new();
        };
        let mut drained =
            std::mem::take(&mut *tasks.lock().unwrap_or_else(PoisonError::into_inner));

        let mut outcomes = Vec::with_capacity(drained.len());
        while let Some(joined) = drained.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(error = %e, "Async job did not complete");
                    outcomes.push(JobOutcome {
                        method: "UNKNOWN",
                        url: String::new(),
                        result: Err(JiraError::ApiError {
                            message: e.to_string(),
                            status_code: None,
                        }),
                    });
                }
            }
        }
        outcomes
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<JobOutcome>> {
        self.tasks
            .get_or_init(|| {
                tracing::debug!("Initialising async job registry");
                Mutex::new(JoinSet::new())
            })
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
