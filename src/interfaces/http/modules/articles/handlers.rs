//! Article API handlers
//!
//! `author` and `favorited` usernames are resolved to ids here; an unknown
//! username is a 404 rather than an empty list.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    ArticleResponse, CreateArticleRequest, FeedQuery, ListArticlesQuery, UpdateArticleRequest,
};
use crate::application::{ArticleListView, FeedRequest, ListArticles};
use crate::interfaces::http::common::{ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::{AuthenticatedUser, Viewer};
use crate::interfaces::http::state::ApiState;

async fn respond(
    state: &ApiState,
    article: &crate::domain::Article,
    viewer_id: Option<i64>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state.views.article(article, viewer_id).await?;
    Ok(Json(ArticleResponse { article }))
}

#[utoipa::path(
    get,
    path = "/api/articles",
    tag = "Articles",
    params(ListArticlesQuery),
    responses(
        (status = 200, description = "Articles, most recent first", body = ArticleListView),
        (status = 404, description = "Unknown author or favoriter", body = ErrorBody)
    )
)]
pub async fn list_articles(
    State(state): State<ApiState>,
    viewer: Viewer,
    Query(query): Query<ListArticlesQuery>,
) -> ApiResult<Json<ArticleListView>> {
    let author_id = match query.author.as_deref() {
        Some(username) => Some(state.users.get_profile(username).await?.id),
        None => None,
    };
    let favoriter_id = match query.favorited.as_deref() {
        Some(username) => Some(state.users.get_profile(username).await?.id),
        None => None,
    };

    let page = state
        .articles
        .list(ListArticles {
            tag: query.tag,
            favoriter_id,
            author_id,
            params: state.list_params(query.offset, query.limit),
        })
        .await?;

    Ok(Json(state.views.article_list(page, viewer.user_id()).await?))
}

#[utoipa::path(
    get,
    path = "/api/articles/feed",
    tag = "Articles",
    security(("token_auth" = [])),
    params(FeedQuery),
    responses(
        (status = 200, description = "Articles by followed authors", body = ArticleListView),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn feed(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<ArticleListView>> {
    let me = state.users.get(auth.user_id).await?;
    let following_ids: BTreeSet<i64> = me.followings.clone();

    let page = state
        .articles
        .feed(FeedRequest {
            user_id: me.id,
            following_ids,
            params: state.list_params(query.offset, query.limit),
        })
        .await?;

    Ok(Json(state.views.article_list(page, Some(me.id)).await?))
}

#[utoipa::path(
    post,
    path = "/api/articles",
    tag = "Articles",
    security(("token_auth" = [])),
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Slug taken", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn create_article(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateArticleRequest>,
) -> ApiResult<(StatusCode, Json<ArticleResponse>)> {
    let article = state
        .articles
        .create(auth.user_id, request.article.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        respond(&state, &article, Some(auth.user_id)).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    tag = "Articles",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_article(
    State(state): State<ApiState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state.articles.get(&slug).await?;
    respond(&state, &article, viewer.user_id()).await
}

#[utoipa::path(
    put,
    path = "/api/articles/{slug}",
    tag = "Articles",
    security(("token_auth" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found or not the author", body = ErrorBody),
        (status = 409, description = "New slug taken", body = ErrorBody)
    )
)]
pub async fn update_article(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state
        .articles
        .update(auth.user_id, &slug, request.article.into())
        .await?;
    respond(&state, &article, Some(auth.user_id)).await
}

#[utoipa::path(
    delete,
    path = "/api/articles/{slug}",
    tag = "Articles",
    security(("token_auth" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 204, description = "Deleted, or already absent"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not the author", body = ErrorBody)
    )
)]
pub async fn delete_article(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    state.articles.delete(auth.user_id, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/articles/{slug}/favorite",
    tag = "Articles",
    security(("token_auth" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Favorited", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn favorite_article(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state.articles.favorite(auth.user_id, &slug).await?;
    respond(&state, &article, Some(auth.user_id)).await
}

#[utoipa::path(
    delete,
    path = "/api/articles/{slug}/favorite",
    tag = "Articles",
    security(("token_auth" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Unfavorited", body = ArticleResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn unfavorite_article(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state.articles.unfavorite(auth.user_id, &slug).await?;
    respond(&state, &article, Some(auth.user_id)).await
}
