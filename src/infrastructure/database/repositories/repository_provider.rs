//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{ArticleRepository, RepositoryProvider, UserRepository};

use super::article_repository::SeaOrmArticleRepository;
use super::user_repository::SeaOrmUserRepository;
use super::WriteLock;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
/// Both repositories share one [`WriteLock`].
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let alice = repos.users().get_by_username("alice").await?;
/// let article = repos.articles().get("hello-world").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    articles: SeaOrmArticleRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        let writes = WriteLock::default();
        Self {
            users: SeaOrmUserRepository::with_write_lock(db.clone(), writes.clone()),
            articles: SeaOrmArticleRepository::with_write_lock(db, writes),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn articles(&self) -> &dyn ArticleRepository {
        &self.articles
    }
}
