//! Shared state for the API handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::application::{ArticleService, UserService, ViewComposer};
use crate::config::PaginationConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::AuthState;
use crate::shared::ListParams;

/// State behind every `/api` route. Axum extracts `AuthState` via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub users: Arc<UserService>,
    pub articles: Arc<ArticleService>,
    pub views: Arc<ViewComposer>,
    pub jwt_config: JwtConfig,
    pub pagination: PaginationConfig,
}

impl ApiState {
    /// Window from query parameters, using the configured default and cap.
    pub fn list_params(&self, offset: Option<u64>, limit: Option<u64>) -> ListParams {
        ListParams::new(
            offset,
            limit.or(Some(self.pagination.default_limit)),
            self.pagination.max_limit,
        )
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        AuthState {
            jwt_config: s.jwt_config.clone(),
        }
    }
}
