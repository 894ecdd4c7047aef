//! Registration, login and the current user
//!
//! Delegates to `UserService`; the handlers issue and echo JWTs.

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::warn;

use super::dto::{LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse, UserView};
use crate::domain::{DomainError, User};
use crate::infrastructure::crypto::jwt::create_token;
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

fn issue(state: &ApiState, user: User) -> ApiResult<Json<UserResponse>> {
    let token = create_token(user.id, &user.username, &state.jwt_config)
        .map_err(|e| ApiError::internal(format!("failed to issue token: {}", e)))?;
    Ok(Json(UserResponse {
        user: UserView::new(user, token),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 409, description = "Email or username taken", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.users.register(request.user.into()).await?;
    Ok((StatusCode::CREATED, issue(&state, user)?))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = match state
        .users
        .login(&request.user.email, &request.user.password)
        .await
    {
        Ok(user) => user,
        Err(DomainError::NotFound { .. }) | Err(DomainError::IncorrectPassword) => {
            warn!(email = %request.user.email, "Failed login attempt");
            return Err(ApiError::unauthorized("email or password is invalid"));
        }
        Err(e) => return Err(e.into()),
    };
    issue(&state, user)
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Users",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn current_user(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get(auth.user_id).await?;
    Ok(Json(UserResponse {
        user: UserView::new(user, auth.token),
    }))
}

/// A fresh token is issued since the username inside the old one may have changed.
#[utoipa::path(
    put,
    path = "/api/user",
    tag = "Users",
    security(("token_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Email or username taken", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.update(auth.user_id, request.user.into()).await?;
    issue(&state, user)
}
