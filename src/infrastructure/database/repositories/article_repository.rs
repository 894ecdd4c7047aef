use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::domain::{Article, ArticleDraft, ArticleRepository, Comment, DomainError, DomainResult};
use crate::infrastructure::database::entities::{article, article_tag, comment, favorite, tag};
use crate::shared::{ListParams, Page};

use super::WriteLock;

pub struct SeaOrmArticleRepository {
    db: DatabaseConnection,
    writes: WriteLock,
}

impl SeaOrmArticleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_write_lock(db, WriteLock::default())
    }

    /// Share `writes` with the other repositories on the same pool.
    pub fn with_write_lock(db: DatabaseConnection, writes: WriteLock) -> Self {
        Self { db, writes }
    }

    /// Count the matches, then fetch one window newest first.
    async fn page(
        &self,
        query: Select<article::Entity>,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        let total = query.clone().count(&self.db).await?;
        // Offsets past the end must not reach the driver, which binds them as i64.
        if params.is_past(total) {
            return Ok(Page::new(Vec::new(), total));
        }

        let models = query
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id)
            .offset(params.offset)
            .limit(params.limit)
            .all(&self.db)
            .await?;

        Ok(Page::new(hydrate(&self.db, models).await?, total))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

/// Load tags and favorites for a batch of article rows, keeping row order.
async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    models: Vec<article::Model>,
) -> DomainResult<Vec<Article>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

    let links = article_tag::Entity::find()
        .filter(article_tag::Column::ArticleId.is_in(ids.clone()))
        .all(conn)
        .await?;
    let tag_ids: BTreeSet<i64> = links.iter().map(|l| l.tag_id).collect();
    let tag_names: HashMap<i64, String> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut tags: HashMap<i64, BTreeSet<String>> = HashMap::new();
    for link in links {
        if let Some(name) = tag_names.get(&link.tag_id) {
            tags.entry(link.article_id).or_default().insert(name.clone());
        }
    }

    let mut favorites: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for fav in favorite::Entity::find()
        .filter(favorite::Column::ArticleId.is_in(ids))
        .all(conn)
        .await?
    {
        favorites.entry(fav.article_id).or_default().insert(fav.user_id);
    }

    Ok(models
        .into_iter()
        .map(|m| Article {
            tags: tags.remove(&m.id).unwrap_or_default(),
            favorites: favorites.remove(&m.id).unwrap_or_default(),
            id: m.id,
            slug: m.slug,
            title: m.title,
            description: m.description,
            body: m.body,
            author_id: m.author_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
        .collect())
}

async fn hydrate_one<C: ConnectionTrait>(conn: &C, model: article::Model) -> DomainResult<Article> {
    let slug = model.slug.clone();
    hydrate(conn, vec![model])
        .await?
        .pop()
        .ok_or_else(|| article_not_found(&slug))
}

fn comment_model_to_domain(model: comment::Model) -> Comment {
    Comment {
        id: model.id,
        article_id: model.article_id,
        author_id: model.author_id,
        body: model.body,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

async fn find_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> DomainResult<Option<article::Model>> {
    Ok(article::Entity::find()
        .filter(article::Column::Slug.eq(slug))
        .one(conn)
        .await?)
}

async fn require_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> DomainResult<article::Model> {
    find_by_slug(conn, slug)
        .await?
        .ok_or_else(|| article_not_found(slug))
}

/// Link `tags` to the article, creating tag rows the first time a name is used.
async fn attach_tags<C: ConnectionTrait>(
    conn: &C,
    article_id: i64,
    tags: &BTreeSet<String>,
) -> DomainResult<()> {
    for name in tags {
        let existing = tag::Entity::find()
            .filter(tag::Column::Name.eq(name.as_str()))
            .one(conn)
            .await?;
        let tag_id = match existing {
            Some(t) => t.id,
            None => {
                tag::ActiveModel {
                    name: Set(name.clone()),
                    ..Default::default()
                }
                .insert(conn)
                .await?
                .id
            }
        };

        article_tag::ActiveModel {
            article_id: Set(article_id),
            tag_id: Set(tag_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

fn article_not_found(slug: &str) -> DomainError {
    DomainError::not_found("article", "slug", slug)
}

fn slug_taken(slug: &str) -> DomainError {
    DomainError::AlreadyExists(format!("article with slug: {} already exists", slug))
}

fn write_err(slug: &str, e: sea_orm::DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") {
        slug_taken(slug)
    } else {
        e.into()
    }
}

/// Rows referencing users fail the foreign key when the user is gone.
fn user_ref_err(user_id: i64, e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            DomainError::not_found("user", "id", user_id)
        }
        _ => e.into(),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl ArticleRepository for SeaOrmArticleRepository {
    async fn create(&self, author_id: i64, draft: ArticleDraft) -> DomainResult<Article> {
        let slug = draft.slug();
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;

        if find_by_slug(&txn, &slug).await?.is_some() {
            return Err(slug_taken(&slug));
        }

        let now = Utc::now();
        let model = article::ActiveModel {
            slug: Set(slug.clone()),
            title: Set(draft.title),
            description: Set(draft.description),
            body: Set(draft.body),
            author_id: Set(author_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => user_ref_err(author_id, e),
            _ => write_err(&slug, e),
        })?;

        attach_tags(&txn, model.id, &draft.tags).await?;
        let created = hydrate_one(&txn, model).await?;
        txn.commit().await?;

        debug!(article_id = created.id, slug = %created.slug, "article stored");
        Ok(created)
    }

    async fn update(&self, slug: &str, draft: ArticleDraft) -> DomainResult<Article> {
        let new_slug = draft.slug();
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;

        let existing = require_by_slug(&txn, slug).await?;
        if new_slug != slug && find_by_slug(&txn, &new_slug).await?.is_some() {
            return Err(slug_taken(&new_slug));
        }
        let article_id = existing.id;

        let mut active: article::ActiveModel = existing.into();
        active.slug = Set(new_slug.clone());
        active.title = Set(draft.title);
        active.description = Set(draft.description);
        active.body = Set(draft.body);
        active.updated_at = Set(Utc::now());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| write_err(&new_slug, e))?;

        article_tag::Entity::delete_many()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .exec(&txn)
            .await?;
        attach_tags(&txn, article_id, &draft.tags).await?;

        let updated = hydrate_one(&txn, updated).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, slug: &str) -> DomainResult<()> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;

        let Some(existing) = find_by_slug(&txn, slug).await? else {
            debug!(slug, "delete of absent article ignored");
            return Ok(());
        };

        comment::Entity::delete_many()
            .filter(comment::Column::ArticleId.eq(existing.id))
            .exec(&txn)
            .await?;
        favorite::Entity::delete_many()
            .filter(favorite::Column::ArticleId.eq(existing.id))
            .exec(&txn)
            .await?;
        article_tag::Entity::delete_many()
            .filter(article_tag::Column::ArticleId.eq(existing.id))
            .exec(&txn)
            .await?;
        article::Entity::delete_by_id(existing.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn get(&self, slug: &str) -> DomainResult<Article> {
        let model = require_by_slug(&self.db, slug).await?;
        hydrate_one(&self.db, model).await
    }

    async fn list(&self, params: ListParams) -> DomainResult<Page<Article>> {
        self.page(article::Entity::find(), params).await
    }

    async fn list_by_tag(&self, tag_name: &str, params: ListParams) -> DomainResult<Page<Article>> {
        let Some(tag) = tag::Entity::find()
            .filter(tag::Column::Name.eq(tag_name))
            .one(&self.db)
            .await?
        else {
            return Ok(Page::empty());
        };

        let tagged = Query::select()
            .column(article_tag::Column::ArticleId)
            .from(article_tag::Entity)
            .and_where(article_tag::Column::TagId.eq(tag.id))
            .to_owned();

        self.page(
            article::Entity::find().filter(article::Column::Id.in_subquery(tagged)),
            params,
        )
        .await
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        self.page(
            article::Entity::find().filter(article::Column::AuthorId.eq(author_id)),
            params,
        )
        .await
    }

    async fn list_by_favoriter(
        &self,
        user_id: i64,
        params: ListParams,
    ) -> DomainResult<Page<Article>> {
        let favorited = Query::select()
            .column(favorite::Column::ArticleId)
            .from(favorite::Entity)
            .and_where(favorite::Column::UserId.eq(user_id))
            .to_owned();

        self.page(
            article::Entity::find().filter(article::Column::Id.in_subquery(favorited)),
            params,
        )
        .await
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
        self.page(
            article::Entity::find()
                .filter(article::Column::AuthorId.is_in(following_ids.iter().copied())),
            params,
        )
        .await
    }

    async fn add_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;
        let model = require_by_slug(&txn, slug).await?;

        let exists = favorite::Entity::find_by_id((model.id, user_id))
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            favorite::ActiveModel {
                article_id: Set(model.id),
                user_id: Set(user_id),
            }
            .insert(&txn)
            .await
            .map_err(|e| user_ref_err(user_id, e))?;
        }

        let article = hydrate_one(&txn, model).await?;
        txn.commit().await?;
        Ok(article)
    }

    async fn remove_favorite(&self, slug: &str, user_id: i64) -> DomainResult<Article> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;
        let model = require_by_slug(&txn, slug).await?;

        favorite::Entity::delete_by_id((model.id, user_id))
            .exec(&txn)
            .await?;

        let article = hydrate_one(&txn, model).await?;
        txn.commit().await?;
        Ok(article)
    }

    async fn add_comment(&self, slug: &str, author_id: i64, body: &str) -> DomainResult<Comment> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;
        let article = require_by_slug(&txn, slug).await?;

        let now = Utc::now();
        let model = comment::ActiveModel {
            article_id: Set(article.id),
            author_id: Set(author_id),
            body: Set(body.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| user_ref_err(author_id, e))?;

        txn.commit().await?;
        Ok(comment_model_to_domain(model))
    }

    async fn get_comment(&self, slug: &str, comment_id: i64) -> DomainResult<Comment> {
        let article = require_by_slug(&self.db, slug).await?;
        comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::ArticleId.eq(article.id))
            .one(&self.db)
            .await?
            .map(comment_model_to_domain)
            .ok_or_else(|| DomainError::not_found("comment", "id", comment_id))
    }

    async fn delete_comment(&self, slug: &str, comment_id: i64) -> DomainResult<()> {
        let _writer = self.writes.acquire().await;
        let Some(article) = find_by_slug(&self.db, slug).await? else {
            return Ok(());
        };
        comment::Entity::delete_many()
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::ArticleId.eq(article.id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn comments(&self, slug: &str) -> DomainResult<Vec<Comment>> {
        let article = require_by_slug(&self.db, slug).await?;
        let models = comment::Entity::find()
            .filter(comment::Column::ArticleId.eq(article.id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(comment_model_to_domain).collect())
    }

    async fn tags(&self) -> DomainResult<Vec<String>> {
        let in_use = Query::select()
            .column(article_tag::Column::TagId)
            .from(article_tag::Entity)
            .to_owned();

        let tags = tag::Entity::find()
            .filter(tag::Column::Id.in_subquery(in_use))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }
}
