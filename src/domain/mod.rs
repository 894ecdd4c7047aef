pub mod article;
pub mod repositories;
pub mod user;

// Re-export commonly used types
pub use article::{slugify, Article, ArticleChanges, ArticleDraft, ArticleRepository, Comment};
pub use repositories::RepositoryProvider;
pub use user::{NewUser, User, UserRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
