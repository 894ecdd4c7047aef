//! In-memory repositories for development and testing
//!
//! Each repository keeps its whole state behind one `tokio::sync::RwLock`.
//! Readers share the lock; every mutation, including the two-sided follow
//! update, holds the write lock for its full duration.

mod articles;
mod users;

pub use articles::InMemoryArticleRepository;
pub use users::InMemoryUserRepository;

use crate::domain::{ArticleRepository, RepositoryProvider, UserRepository};

/// `RepositoryProvider` over freshly constructed in-memory repositories.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    users: InMemoryUserRepository,
    articles: InMemoryArticleRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn articles(&self) -> &dyn ArticleRepository {
        &self.articles
    }
}
