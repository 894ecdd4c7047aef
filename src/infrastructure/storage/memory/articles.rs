use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Article, ArticleDraft, ArticleRepository, Comment, DomainError, DomainResult};
use crate::shared::{ListParams, Page};

struct StoredArticle {
    article: Article,
    comments: BTreeMap<i64, Comment>,
}

#[derive(Default)]
struct ArticleTable {
    last_article_id: i64,
    last_comment_id: i64,
    by_slug: HashMap<String, StoredArticle>,
}

impl ArticleTable {
    fn stored(&self, slug: &str) -> DomainResult<&StoredArticle> {
        self.by_slug.get(slug).ok_or_else(|| article_not_found(slug))
    }

    fn stored_mut(&mut self, slug: &str) -> DomainResult<&mut StoredArticle> {
        self.by_slug
            .get_mut(slug)
            .ok_or_else(|| article_not_found(slug))
    }

    /// Newest first; id breaks ties between articles created in the same instant.
    fn select(&self, params: ListParams, keep: impl Fn(&Article) -> bool) -> Page<Article> {
        let mut matches: Vec<&Article> = self
            .by_slug
            .values()
            .map(|s| &s.article)
            .filter(|a| keep(a))
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matches.len() as u64;
        let items = params.window(matches.into_iter().cloned());
        Page::new(items, total)
    }
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    table: RwLock<ArticleTable>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn create(&self, author_id: i64, draft: ArticleDraft) -> DomainResult<Article> {
        let slug = draft.slug();
        let mut table = self.table.write().await;

        if table.by_slug.contains_key(&slug) {
            return Err(slug_taken(&slug));
        }

        table.last_article_id += 1;
        let now = Utc::now();
        let article = Article {
            id: table.last_article_id,
            slug: slug.clone(),
            title: draft.title,
            description: draft.description,
            body: draft.body,
            author_id,
            tags: draft.tags,
            favorites: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };

        table.by_slug.insert(
            slug,
            StoredArticle {
                article: article.clone(),
                comments: BTreeMap::new(),
            },
        );

        debug!(article_id = article.id, slug = %article.slug, "article stored");
        Ok(article)
    }

    async fn update(&self, slug: &str, draft: ArticleDraft) -> DomainResult<Article> {
        let new_slug = draft.slug();
        let mut table = self.table.write().await;

        table.stored(slug)?;
        if new_slug != slug && table.by_slug.contains_key(&new_slug) {
            return Err(slug_taken(&new_slug));
        }

        let Some(mut stored) = table.by_slug.remove(slug) else {
            return Err(article_not_found(slug));
        };

        let article = &mut stored.article;
        article.slug = new_slug.clone();
        article.title = draft.title;
        article.description = draft.description;
        article.body = draft.body;
        article.tags = draft.tags;
        article.updated_at = Utc::now();

        let updated = article.clone();
        table.by_slug.insert(new_slug, stored);
        Ok(updated)
    }

    async fn delete(&self, slug: &str) -> DomainResult<()> {
        let mut table = self.table.write().await;
        if table.by_slug.remove(slug).is_none() {
            debug!(slug, "delete of absent article ignored");
        }
        Ok(())
    }

    async fn get(&self, slug: &str) -> DomainResult<Article> {
        let table = self.table.read().await;
        Ok(table.stored(slug)?.article.clone())
    }

    async fn list(&self, params: ListParams) -> DomainResult<Page<Article>> {
        let table = self.table.read().await;
        Ok(table.select(params, |_| true))
    }

    async fn list_by_tag(&self, tag: &str, params: ListParams) -> DomainResult<Page<Article>> {
        let table = self.table.read().await;
        Ok(table.select(params, |a| a.tags.contains(tag)))
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        let table = self.table.read().await;
        Ok(table.select(params, |a| a.author_id == author_id))
    }

    async fn list_by_favoriter(
        &self,
        user_id: i64,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        let table = self.table.read().await;
        Ok(table.select(params, |a| a.is_favorited_by(user_id)))
    }

    async fn feed(
        &self,
        _user_id: i64,
        following_ids: &BTreeSet<i64>,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        if following_ids.is_empty() {
            return Ok(Page::empty());
        }
        let table = self.table.read().await;
        Ok(table.select(params, |a| following_ids.contains(&a.author_id)))
    }

    async fn add_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article> {
        let mut table = self.table.write().await;
        let stored = table.stored_mut(slug)?;
        stored.article.favorites.insert(user_id);
        Ok(stored.article.clone())
    }

    async fn remove_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article> {
        let mut table = self.table.write().await;
        let stored = table.stored_mut(slug)?;
        stored.article.favorites.remove(&user_id);
        Ok(stored.article.clone())
    }

    async fn add_comment(&self, slug: &str, author_id: i64, body: &str) -> DomainResult<Comment> {
        let mut table = self.table.write().await;
        table.stored(slug)?;

        table.last_comment_id += 1;
        let id = table.last_comment_id;
        let stored = table.stored_mut(slug)?;
        let now = Utc::now();
        let comment = Comment {
            id,
            article_id: stored.article.id,
            author_id,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        stored.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, slug: &str, comment_id: i64) -> DomainResult<Comment> {
        let table = self.table.read().await;
        table
            .stored(slug)?
            .comments
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("comment", "id", comment_id))
    }

    async fn delete_comment(&self, slug: &str, comment_id: i64) -> DomainResult<()> {
        let mut table = self.table.write().await;
        if let Some(stored) = table.by_slug.get_mut(slug) {
            stored.comments.remove(&comment_id);
        }
        Ok(())
    }

    async fn comments(&self, slug: &str) -> DomainResult<Vec<Comment>> {
        let table = self.table.read().await;
        Ok(table.stored(slug)?.comments.values().cloned().collect())
    }

    async fn tags(&self) -> DomainResult<Vec<String>> {
        let table = self.table.read().await;
        let tags: BTreeSet<&String> = table
            .by_slug
            .values()
            .flat_map(|s| s.article.tags.iter())
            .collect();
        Ok(tags.into_iter().cloned().collect())
    }
}

fn article_not_found(slug: &str) -> DomainError {
    DomainError::not_found("article", "slug", slug)
}

fn slug_taken(slug: &str) -> DomainError {
    DomainError::AlreadyExists(format!("article with slug: {} already exists", slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.to_string(),
            description: "d".to_string(),
            body: "b".to_string(),
            tags: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn comment_ids_are_independent_of_article_ids() {
        let repo = InMemoryArticleRepository::new();
        repo.create(1, draft("One")).await.unwrap();
        repo.create(1, draft("Two")).await.unwrap();

        let c = repo.add_comment("one", 2, "first").await.unwrap();
        assert_eq!(c.id, 1);
    }

    #[tokio::test]
    async fn comment_on_missing_article_is_not_found() {
        let repo = InMemoryArticleRepository::new();
        let err = repo.add_comment("nope", 1, "hi").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rename_frees_the_old_slug() {
        let repo = InMemoryArticleRepository::new();
        repo.create(1, draft("Old")).await.unwrap();
        repo.update("old", draft("New")).await.unwrap();

        assert!(repo.get("old").await.unwrap_err().is_not_found());
        repo.create(1, draft("Old")).await.unwrap();
    }

    #[tokio::test]
    async fn rename_onto_another_article_is_rejected() {
        let repo = InMemoryArticleRepository::new();
        repo.create(1, draft("First")).await.unwrap();
        repo.create(1, draft("Second")).await.unwrap();

        let err = repo.update("second", draft("First")).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(repo.get("second").await.unwrap().title, "Second");
    }
}
