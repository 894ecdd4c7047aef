//! View composer
//!
//! Builds response shapes from domain entities and the current viewer.
//! `favorited` and `following` are derived from the favorite and follower
//! sets; both are false when there is no authenticated viewer. Failing to
//! resolve the viewer or an author aborts composition with that error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::identity::UserService;
use crate::application::publishing::ArticleService;
use crate::domain::{Article, Comment, DomainResult, User};
use crate::shared::Page;

use super::model::{ArticleListView, ArticleView, CommentView, ProfileView};

pub struct ViewComposer {
    users: Arc<UserService>,
    articles: Arc<ArticleService>,
}

impl ViewComposer {
    pub fn new(users: Arc<UserService>, articles: Arc<ArticleService>) -> Self {
        Self { users, articles }
    }

    pub async fn profile(&self, user: &User, viewer_id: Option<i64>) -> DomainResult<ProfileView> {
        let viewer = self.viewer(viewer_id).await?;
        Ok(profile_view(user, viewer.as_ref()))
    }

    pub async fn article(
        &self,
        article: &Article,
        viewer_id: Option<i64>,
    ) -> DomainResult<ArticleView> {
        let viewer = self.viewer(viewer_id).await?;
        let author = self.users.get(article.author_id).await?;
        Ok(article_view(article, &author, viewer.as_ref()))
    }

    /// Compose every item of a page; `articles_count` carries the page total.
    pub async fn article_list(
        &self,
        page: Page<Article>,
        viewer_id: Option<i64>,
    ) -> DomainResult<ArticleListView> {
        let viewer = self.viewer(viewer_id).await?;
        let mut authors: HashMap<i64, User> = HashMap::new();
        let mut views = Vec::with_capacity(page.items.len());

        for article in &page.items {
            if !authors.contains_key(&article.author_id) {
                let author = self.users.get(article.author_id).await?;
                authors.insert(author.id, author);
            }
            if let Some(author) = authors.get(&article.author_id) {
                views.push(article_view(article, author, viewer.as_ref()));
            }
        }

        Ok(ArticleListView {
            articles: views,
            articles_count: page.total,
        })
    }

    pub async fn comment(
        &self,
        comment: &Comment,
        viewer_id: Option<i64>,
    ) -> DomainResult<CommentView> {
        let viewer = self.viewer(viewer_id).await?;
        let author = self.users.get(comment.author_id).await?;
        Ok(comment_view(comment, &author, viewer.as_ref()))
    }

    /// All comments on `slug`, oldest first.
    pub async fn comments(&self, slug: &str, viewer_id: Option<i64>) -> DomainResult<Vec<CommentView>> {
        let comments = self.articles.comments(slug).await?;
        let viewer = self.viewer(viewer_id).await?;
        let mut authors: HashMap<i64, User> = HashMap::new();
        let mut views = Vec::with_capacity(comments.len());

        for comment in &comments {
            if !authors.contains_key(&comment.author_id) {
                let author = self.users.get(comment.author_id).await?;
                authors.insert(author.id, author);
            }
            if let Some(author) = authors.get(&comment.author_id) {
                views.push(comment_view(comment, author, viewer.as_ref()));
            }
        }
        Ok(views)
    }

    async fn viewer(&self, viewer_id: Option<i64>) -> DomainResult<Option<User>> {
        match viewer_id {
            Some(id) => Ok(Some(self.users.get(id).await?)),
            None => Ok(None),
        }
    }
}

fn profile_view(user: &User, viewer: Option<&User>) -> ProfileView {
    ProfileView {
        username: user.username.clone(),
        bio: user.bio.clone(),
        image: user.image.clone(),
        following: viewer.is_some_and(|v| user.is_followed_by(v.id)),
    }
}

fn article_view(article: &Article, author: &User, viewer: Option<&User>) -> ArticleView {
    ArticleView {
        slug: article.slug.clone(),
        title: article.title.clone(),
        description: article.description.clone(),
        body: article.body.clone(),
        tag_list: article.tags.iter().cloned().collect(),
        created_at: article.created_at,
        updated_at: article.updated_at,
        favorited: viewer.is_some_and(|v| article.is_favorited_by(v.id)),
        favorites_count: article.favorites_count(),
        author: profile_view(author, viewer),
    }
}

fn comment_view(comment: &Comment, author: &User, viewer: Option<&User>) -> CommentView {
    CommentView {
        id: comment.id,
        body: comment.body.clone(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        author: profile_view(author, viewer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::RegisterUser;
    use crate::domain::ArticleDraft;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    struct Fixture {
        users: Arc<UserService>,
        articles: Arc<ArticleService>,
        composer: ViewComposer,
    }

    fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let users = Arc::new(UserService::new(repos.clone()));
        let articles = Arc::new(ArticleService::new(repos));
        let composer = ViewComposer::new(users.clone(), articles.clone());
        Fixture {
            users,
            articles,
            composer,
        }
    }

    async fn register(users: &UserService, name: &str) -> User {
        users
            .register(RegisterUser {
                username: name.into(),
                email: format!("{}@x.com", name),
                password: "pw123456".into(),
            })
            .await
            .unwrap()
    }

    fn draft(title: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.into(),
            description: "d".into(),
            body: "b".into(),
            tags: Default::default(),
        }
    }

    #[tokio::test]
    async fn viewer_relative_flags() {
        let f = fixture();
        let author = register(&f.users, "author").await;
        let viewer = register(&f.users, "viewer").await;

        f.articles.create(author.id, draft("Post")).await.unwrap();
        f.users.follow(viewer.id, "author").await.unwrap();
        let article = f.articles.favorite(viewer.id, "post").await.unwrap();

        let seen = f.composer.article(&article, Some(viewer.id)).await.unwrap();
        assert!(seen.favorited);
        assert!(seen.author.following);
        assert_eq!(seen.favorites_count, 1);

        let anonymous = f.composer.article(&article, None).await.unwrap();
        assert!(!anonymous.favorited);
        assert!(!anonymous.author.following);
        assert_eq!(anonymous.favorites_count, 1);
    }

    #[tokio::test]
    async fn unknown_viewer_aborts_composition() {
        let f = fixture();
        let author = register(&f.users, "author").await;
        let article = f.articles.create(author.id, draft("Post")).await.unwrap();

        let err = f.composer.article(&article, Some(999)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unknown_author_aborts_composition() {
        let f = fixture();
        let author = register(&f.users, "author").await;
        let mut orphan = f.articles.create(author.id, draft("Orphan")).await.unwrap();
        orphan.author_id = 42;

        let err = f.composer.article(&orphan, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_count_is_the_page_total() {
        let f = fixture();
        let author = register(&f.users, "author").await;
        for title in ["One", "Two", "Three"] {
            f.articles.create(author.id, draft(title)).await.unwrap();
        }

        let page = f
            .articles
            .list(crate::application::publishing::ListArticles {
                params: crate::shared::ListParams { offset: 0, limit: 2 },
                ..Default::default()
            })
            .await
            .unwrap();
        let view = f.composer.article_list(page, None).await.unwrap();

        assert_eq!(view.articles.len(), 2);
        assert_eq!(view.articles_count, 3);
        assert_eq!(view.articles[0].slug, "three");
    }
}
