//! Article and comment domain entities

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// Derive the URL slug for a title. The same title always yields the same slug.
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

/// Published article with its tags and favorite set.
///
/// Comments are owned by the article store as well but are read through
/// `ArticleRepository::comments` rather than carried on every article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i64,
    pub tags: BTreeSet<String>,
    /// Ids of users who favorited this article
    pub favorites: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn is_favorited_by(&self, user_id: i64) -> bool {
        self.favorites.contains(&user_id)
    }

    pub fn favorites_count(&self) -> u64 {
        self.favorites.len() as u64
    }
}

/// The author-editable part of an article.
///
/// Passed to `create` and `update`; the store derives the slug from the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: BTreeSet<String>,
}

impl ArticleDraft {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Partial change set for an existing article. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl ArticleChanges {
    /// Overlay these changes on `article` to produce the full replacement draft.
    pub fn apply_to(self, article: &Article) -> ArticleDraft {
        ArticleDraft {
            title: self.title.unwrap_or_else(|| article.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| article.description.clone()),
            body: self.body.unwrap_or_else(|| article.body.clone()),
            tags: self.tags.unwrap_or_else(|| article.tags.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
