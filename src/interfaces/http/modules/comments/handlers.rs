use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{AddCommentRequest, CommentResponse, CommentsResponse};
use crate::interfaces::http::common::{ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::{AuthenticatedUser, Viewer};
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/articles/{slug}/comments",
    tag = "Comments",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Comments, oldest first", body = CommentsResponse),
        (status = 404, description = "Article not found", body = ErrorBody)
    )
)]
pub async fn list_comments(
    State(state): State<ApiState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<CommentsResponse>> {
    let comments = state.views.comments(&slug, viewer.user_id()).await?;
    Ok(Json(CommentsResponse { comments }))
}

#[utoipa::path(
    post,
    path = "/api/articles/{slug}/comments",
    tag = "Comments",
    security(("token_auth" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Article not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn add_comment(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let comment = state
        .articles
        .add_comment(auth.user_id, &slug, &request.comment.body)
        .await?;
    let comment = state.views.comment(&comment, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

#[utoipa::path(
    delete,
    path = "/api/articles/{slug}/comments/{id}",
    tag = "Comments",
    security(("token_auth" = [])),
    params(
        ("slug" = String, Path, description = "Article slug"),
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Deleted, or already absent"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not the author", body = ErrorBody)
    )
)]
pub async fn delete_comment(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((slug, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    state.articles.delete_comment(auth.user_id, &slug, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
