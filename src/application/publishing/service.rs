//! Article service: application-layer orchestration
//!
//! Thin delegation to the article store plus the authorship rules:
//! only the author may edit or delete an article or a comment, and a
//! mismatch is reported as `NotFound` so existence is not leaked.
//! Articles, favorites and comments are only recorded for existing users.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::{
    Article, ArticleChanges, ArticleDraft, Comment, DomainError, DomainResult, RepositoryProvider,
};
use crate::shared::{ListParams, Page};

/// Filters for [`ArticleService::list`]. When several are set, the tag wins,
/// then the favoriter, then the author.
#[derive(Debug, Clone, Default)]
pub struct ListArticles {
    pub tag: Option<String>,
    pub favoriter_id: Option<i64>,
    pub author_id: Option<i64>,
    pub params: ListParams,
}

/// Feed for `user_id`; the caller resolves who that user follows.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub user_id: i64,
    pub following_ids: BTreeSet<i64>,
    pub params: ListParams,
}

pub struct ArticleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ArticleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Articles ────────────────────────────────────────────────

    pub async fn create(&self, author_id: i64, draft: ArticleDraft) -> DomainResult<Article> {
        ensure_sluggable(&draft)?;
        self.require_user(author_id).await?;
        let article = self.repos.articles().create(author_id, draft).await?;
        info!(article_id = article.id, slug = %article.slug, author_id, "Article created");
        Ok(article)
    }

    pub async fn update(
        &self,
        requester_id: i64,
        slug: &str,
        changes: ArticleChanges,
    ) -> DomainResult<Article> {
        let current = self.owned_article(requester_id, slug).await?;
        let draft = changes.apply_to(&current);
        ensure_sluggable(&draft)?;

        let article = self.repos.articles().update(slug, draft).await?;
        info!(article_id = article.id, slug = %article.slug, "Article updated");
        Ok(article)
    }

    /// Deleting an absent article succeeds; deleting someone else's is `NotFound`.
    pub async fn delete(&self, requester_id: i64, slug: &str) -> DomainResult<()> {
        let article = match self.repos.articles().get(slug).await {
            Ok(article) => article,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        if article.author_id != requester_id {
            return Err(DomainError::not_found("article", "slug", slug));
        }

        self.repos.articles().delete(slug).await?;
        info!(slug, "Article deleted");
        Ok(())
    }

    pub async fn get(&self, slug: &str) -> DomainResult<Article> {
        self.repos.articles().get(slug).await
    }

    pub async fn list(&self, req: ListArticles) -> DomainResult<Page<Article>> {
        let articles = self.repos.articles();
        if let Some(tag) = req.tag.as_deref() {
            articles.list_by_tag(tag, req.params).await
        } else if let Some(user_id) = req.favoriter_id {
            articles.list_by_favoriter(user_id, req.params).await
        } else if let Some(author_id) = req.author_id {
            articles.list_by_author(author_id, req.params).await
        } else {
            articles.list(req.params).await
        }
    }

    pub async fn feed(&self, req: FeedRequest) -> DomainResult<Page<Article>> {
        self.repos
            .articles()
            .feed(req.user_id, &req.following_ids, req.params)
            .await
    }

    pub async fn favorite(&self, user_id: i64, slug: &str) -> DomainResult<Article> {
        self.require_user(user_id).await?;
        self.repos.articles().add_favorite(slug, user_id).await
    }

    pub async fn unfavorite(&self, user_id: i64, slug: &str) -> DomainResult<Article> {
        self.repos.articles().remove_favorite(slug, user_id).await
    }

    pub async fn tags(&self) -> DomainResult<Vec<String>> {
        self.repos.articles().tags().await
    }

    // ── Comments ────────────────────────────────────────────────

    pub async fn add_comment(&self, author_id: i64, slug: &str, body: &str) -> DomainResult<Comment> {
        self.require_user(author_id).await?;
        let comment = self.repos.articles().add_comment(slug, author_id, body).await?;
        info!(comment_id = comment.id, slug, "Comment added");
        Ok(comment)
    }

    /// Same policy as [`ArticleService::delete`]: absent is fine, foreign is `NotFound`.
    pub async fn delete_comment(
        &self,
        requester_id: i64,
        slug: &str,
        comment_id: i64,
    ) -> DomainResult<()> {
        let comment = match self.repos.articles().get_comment(slug, comment_id).await {
            Ok(c) => c,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        if comment.author_id != requester_id {
            return Err(DomainError::not_found("comment", "id", comment_id));
        }

        self.repos.articles().delete_comment(slug, comment_id).await?;
        info!(comment_id, slug, "Comment deleted");
        Ok(())
    }

    pub async fn comments(&self, slug: &str) -> DomainResult<Vec<Comment>> {
        self.repos.articles().comments(slug).await
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn require_user(&self, user_id: i64) -> DomainResult<()> {
        self.repos.users().get_by_id(user_id).await.map(|_| ())
    }

    async fn owned_article(&self, requester_id: i64, slug: &str) -> DomainResult<Article> {
        let article = self.repos.articles().get(slug).await?;
        if article.author_id != requester_id {
            return Err(DomainError::not_found("article", "slug", slug));
        }
        Ok(article)
    }
}

fn ensure_sluggable(draft: &ArticleDraft) -> DomainResult<()> {
    if draft.slug().is_empty() {
        return Err(DomainError::Validation(
            "title must contain at least one letter or digit".into(),
        ));
    }
    Ok(())
}
