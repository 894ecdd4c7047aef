//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives unified access to the per-aggregate
//! repositories. Services depend on it and never on a concrete backend.

use super::article::ArticleRepository;
use super::user::UserRepository;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let author = repos.users().get_by_username("alice").await?;
///     let page = repos.articles().list_by_author(author.id, ListParams::default()).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn articles(&self) -> &dyn ArticleRepository;
}
