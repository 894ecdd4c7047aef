//! Article aggregate
//!
//! Articles, comments, the slug rule and the article store interface.

pub mod model;
pub mod repository;

pub use model::{slugify, Article, ArticleChanges, ArticleDraft, Comment};
pub use repository::ArticleRepository;
