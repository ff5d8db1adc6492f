//! Per-table readers-writer locks, created lazily.
//!
//! Grounded on `examples/original_source/src/db/TableLockManager.h` (an
//! outer map lock guarding a lazily-populated `table_name -> RwLock` map)
//! and on `examples/clockworklabs-SpacetimeDB/crates/core/src/db/relational_db.rs`'s
//! use of `parking_lot` for table-level synchronization. Locks are acquired
//! for the duration of one operator call and released on every exit path by
//! RAII guard drop; chunked sub-tasks run under the caller's already-held
//! guard and never call back into this manager.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Owns one lock per table, created on first reference.
#[derive(Default)]
pub struct LockManager {
    locks: RwLock<FxHashMap<String, Arc<tokio::sync::RwLock<()>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, table: &str) -> Arc<tokio::sync::RwLock<()>> {
        if let Some(lock) = self.locks.read().get(table) {
            return lock.clone();
        }
        self.locks
            .write()
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::RwLock::new(())))
            .clone()
    }

    /// Acquires the shared (reader) lock for `table`.
    pub async fn acquire_read(&self, table: &str) -> ReadGuard {
        let lock = self.lock_for(table);
        ReadGuard::new(lock).await
    }

    /// Acquires the exclusive (writer) lock for `table`.
    pub async fn acquire_write(&self, table: &str) -> WriteGuard {
        let lock = self.lock_for(table);
        WriteGuard::new(lock).await
    }

    /// Drops a table's lock entry entirely, called after `DROP` so a later
    /// table of the same name starts with a fresh, uncontended lock.
    pub fn forget(&self, table: &str) {
        self.locks.write().remove(table);
    }
}

/// A held shared lock, self-referential over the `Arc` so it can outlive the
/// `LockManager::acquire_read` call without borrowing the manager.
pub struct ReadGuard {
    _lock: Arc<tokio::sync::RwLock<()>>,
    guard: Option<tokio::sync::OwnedRwLockReadGuard<()>>,
}

impl ReadGuard {
    async fn new(lock: Arc<tokio::sync::RwLock<()>>) -> Self {
        let guard = lock.clone().read_owned().await;
        Self { _lock: lock, guard: Some(guard) }
    }
}

impl Drop for ReadGuard {
    fn drop(&mut self) {
        self.guard.take();
    }
}

/// A held exclusive lock, same self-referential shape as [`ReadGuard`].
pub struct WriteGuard {
    _lock: Arc<tokio::sync::RwLock<()>>,
    guard: Option<tokio::sync::OwnedRwLockWriteGuard<()>>,
}

impl WriteGuard {
    async fn new(lock: Arc<tokio::sync::RwLock<()>>) -> Self {
        let guard = lock.clone().write_owned().await;
        Self { _lock: lock, guard: Some(guard) }
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.guard.take();
    }
}
