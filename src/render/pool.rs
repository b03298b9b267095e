use std::sync::Arc;

use crate::foundation::error::{FxError, FxResult};

/// Where an engine runs its data-parallel sections.
///
/// The default uses rayon's global pool. A dedicated pool is shared by cloning.
#[derive(Clone, Default)]
pub struct WorkerPool {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl WorkerPool {
    /// `None` uses the global rayon pool; `Some(n)` builds a dedicated pool of `n` workers.
    pub fn new(threads: Option<usize>) -> FxResult<Self> {
        match threads {
            None => Ok(Self::default()),
            Some(n) => Ok(Self {
                pool: Some(Arc::new(build_thread_pool(n)?)),
            }),
        }
    }

    /// Number of worker threads parallel sections will use.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(p) => p.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(p) => p.install(op),
            None => op(),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("dedicated", &self.pool.is_some())
            .field("threads", &self.threads())
            .finish()
    }
}

fn build_thread_pool(threads: usize) -> FxResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(FxError::validation("worker 'threads' must be >= 1 when set"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("framefx-worker-{i}"))
        .build()
        .map_err(|e| FxError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}
