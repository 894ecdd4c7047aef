//! Publishing: articles, favorites, comments and tags

pub mod service;

pub use service::{ArticleService, FeedRequest, ListArticles};
