//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.
//! Every multi-step write runs inside one database transaction, and all
//! writers on one pool take the same [`WriteLock`] first.

pub mod article_repository;
pub mod repository_provider;
pub mod user_repository;

pub use article_repository::SeaOrmArticleRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Serializes write transactions across the repositories sharing a pool.
///
/// SQLite starts transactions deferred and upgrades them to writers on the
/// first write; an upgrade after another connection committed fails with
/// `SQLITE_BUSY`. Holding this lock keeps one writer in flight per process.
#[derive(Clone, Default)]
pub struct WriteLock(Arc<Mutex<()>>);

impl WriteLock {
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}
