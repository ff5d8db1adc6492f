//! Fixed-size task executor backing both async submission and in-place
//! chunked fan-out.
//!
//! Grounded on `examples/clockworklabs-SpacetimeDB/crates/core/src/util/mod.rs`'s
//! `spawn_rayon` helper (`rayon::spawn` + `tokio::sync::oneshot` to bridge a
//! CPU-bound closure back into async code), generalized into a named
//! [`WorkerPool`] type with two entry points: `submit` for fire-and-await
//! work from any thread (mirrors `spec.md` §4.6's `submit(task) -> future<R>`),
//! and `install` for running a closure that performs its own internal
//! `rayon` parallel iteration (chunked `UPDATE`/`SUM`/`ADD`/`SUB`/`SWAP` over
//! a table already held under the caller's lock).

use std::future::Future;

/// A fixed pool of worker threads built on `rayon::ThreadPool`.
///
/// Submission is safe from any thread, including pool threads themselves,
/// since `rayon::ThreadPool::install`/`spawn` support nested calls.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with `threads` workers. `threads == 0` means "use
    /// hardware parallelism", matching spec.md §6.1's `--threads 0`.
    pub fn new(threads: usize) -> anyhow::Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("lemondb-worker-{i}"));
        if threads > 0 {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        Ok(Self { pool })
    }

    /// Runs `f` on the pool and returns a future that resolves with its
    /// result, without blocking the calling (async) task.
    pub fn submit<F, R>(&self, f: F) -> impl Future<Output = R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pool.spawn(move || {
            let _ = tx.send(f());
        });
        async move { rx.await.expect("worker pool task panicked") }
    }

    /// Runs `f` on the pool, blocking the calling thread until it returns.
    /// `f` is expected to use `rayon`'s parallel iterators internally
    /// (`par_chunks`/`par_chunks_mut`) to fan a single operator call out
    /// across the pool while the caller's table lock is held for the whole
    /// call.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    pub fn current_num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}
