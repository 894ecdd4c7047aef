use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ProfileView;
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::{AuthenticatedUser, Viewer};
use crate::interfaces::http::state::ApiState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: ProfileView,
}

#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    tag = "Profiles",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn get_profile(
    State(state): State<ApiState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.users.get_profile(&username).await?;
    let profile = state.views.profile(&user, viewer.user_id()).await?;
    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    post,
    path = "/api/profiles/{username}/follow",
    tag = "Profiles",
    security(("token_auth" = [])),
    params(("username" = String, Path, description = "User to follow")),
    responses(
        (status = 200, description = "Followed", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn follow(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let followee = state.users.follow(auth.user_id, &username).await?;
    let profile = state.views.profile(&followee, Some(auth.user_id)).await?;
    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{username}/follow",
    tag = "Profiles",
    security(("token_auth" = [])),
    params(("username" = String, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "Unfollowed", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn unfollow(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let followee = state.users.unfollow(auth.user_id, &username).await?;
    let profile = state.views.profile(&followee, Some(auth.user_id)).await?;
    Ok(Json(ProfileResponse { profile }))
}
