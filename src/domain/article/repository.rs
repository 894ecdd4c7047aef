//! Article store interface

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::model::{Article, ArticleDraft, Comment};
use crate::shared::{DomainResult, ListParams, Page};

/// Storage and query of articles, their comments, favorites and tags.
///
/// Every list operation orders by creation time, newest first, and reports
/// the number of matches before pagination in `Page::total`.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the draft's slug is taken.
    async fn create(&self, author_id: i64, draft: ArticleDraft) -> DomainResult<Article>;

    /// Replace the editable fields of the article at `slug`.
    ///
    /// Keeps id, author, creation time, comments and favorites. A changed
    /// title moves the article to its new slug; if another article already
    /// holds that slug the call fails with `AlreadyExists`.
    async fn update(&self, slug: &str, draft: ArticleDraft) -> DomainResult<Article>;

    /// Idempotent: deleting an absent slug succeeds.
    async fn delete(&self, slug: &str) -> DomainResult<()>;

    async fn get(&self, slug: &str) -> DomainResult<Article>;

    async fn list(&self, params: ListParams) -> DomainResult<Page<Article>>;

    async fn list_by_tag(&self, tag: &str, params: ListParams) -> DomainResult<Page<Article>>;

    async fn list_by_author(&self, author_id: i64, params: ListParams)
        -> DomainResult<Page<Article>>;

    async fn list_by_favoriter(
        &self,
        user_id: i64,
        params: ListParams,
    ) -> DomainResult<Page<Article>>;

    /// Articles written by any of `following_ids`. An empty set yields an empty page.
    async fn feed(
        &self,
        user_id: i64,
        following_ids: &BTreeSet<i64>,
        params: ListParams,
    ) -> DomainResult<Page<Article>>;

    /// Idempotent insert into the favorite set; returns the article as stored afterwards.
    async fn add_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article>;

    /// Idempotent removal from the favorite set; returns the article as stored afterwards.
    async fn remove_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article>;

    /// Fails with `NotFound` if no article has `slug`.
    async fn add_comment(&self, slug: &str, author_id: i64, body: &str) -> DomainResult<Comment>;

    async fn get_comment(&self, slug: &str, comment_id: i64) -> DomainResult<Comment>;

    /// Idempotent: a missing comment is not an error.
    async fn delete_comment(&self, slug: &str, comment_id: i64) -> DomainResult<()>;

    /// All comments on the article, oldest first.
    async fn comments(&self, slug: &str) -> DomainResult<Vec<Comment>>;

    /// Distinct tag names attached to any stored article.
    async fn tags(&self) -> DomainResult<Vec<String>>;
}
