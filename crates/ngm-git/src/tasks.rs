//! Parallel per-repository jobs
//!
//! [`TaskRunner`] fans one blocking job out per repository and collects the
//! results back in input order. A failing or panicking job only fills its
//! own slot; siblings always run to completion.

use crate::error::{GitError, GitResult};
use std::any::Any;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;

/// Progress callbacks, invoked from worker threads
pub trait TaskObserver: Send + Sync {
    /// Job `index` acquired a slot and is about to run
    fn started(&self, index: usize);

    /// Job `index` finished; `ok` is false on error or panic
    fn finished(&self, index: usize, ok: bool);
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TaskObserver for NoopObserver {
    fn started(&self, _index: usize) {}
    fn finished(&self, _index: usize, _ok: bool) {}
}

/// Default parallelism: one job per available core
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}

/// Bounded fan-out/fan-in executor for per-repository work
pub struct TaskRunner {
    runtime: Runtime,
    max_parallel: usize,
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("max_parallel", &self.max_parallel)
            .finish()
    }
}

impl TaskRunner {
    /// Create a runner allowing at most `max_parallel` concurrent jobs.
    ///
    /// `None` or `Some(0)` uses [`default_parallelism`].
    pub fn new(max_parallel: Option<usize>) -> GitResult<Self> {
        let max_parallel = max_parallel
            .filter(|n| *n > 0)
            .unwrap_or_else(default_parallelism);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(max_parallel)
            .thread_name("ngm-task")
            .enable_all()
            .build()?;

        tracing::debug!(max_parallel, "task runner ready");
        Ok(TaskRunner {
            runtime,
            max_parallel,
        })
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Run `job` once per repository.
    ///
    /// Returns one result per entry of `repos`, in the same order.
    pub fn for_each_repo<T, F>(
        &self,
        repos: &[PathBuf],
        job: F,
        observer: Arc<dyn TaskObserver>,
    ) -> Vec<GitResult<T>>
    where
        T: Send + 'static,
        F: Fn(&Path) -> GitResult<T> + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));

        self.runtime.block_on(async {
            let handles: Vec<_> = repos
                .iter()
                .cloned()
                .enumerate()
                .map(|(index, path)| {
                    let job = Arc::clone(&job);
                    let semaphore = Arc::clone(&semaphore);
                    let observer = Arc::clone(&observer);
                    tokio::spawn(async move {
                        let name = path.display().to_string();
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|e| task_error(&name, e.to_string()))?;

                        observer.started(index);
                        let result = match tokio::task::spawn_blocking(move || (*job)(&path)).await {
                            Ok(result) => result,
                            Err(e) => Err(join_error(&name, e)),
                        };
                        if let Err(e) = &result {
                            tracing::warn!(repo = %name, error = %e, "task failed");
                        }
                        observer.finished(index, result.is_ok());
                        result
                    })
                })
                .collect();

            let mut slots = Vec::with_capacity(handles.len());
            for (handle, path) in handles.into_iter().zip(repos) {
                let slot = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(join_error(&path.display().to_string(), e)),
                };
                slots.push(slot);
            }
            slots
        })
    }
}

fn task_error(name: &str, reason: String) -> GitError {
    GitError::Task {
        name: name.to_string(),
        reason,
    }
}

fn join_error(name: &str, error: tokio::task::JoinError) -> GitError {
    if error.is_panic() {
        task_error(name, panic_message(error.into_panic()))
    } else {
        task_error(name, error.to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
