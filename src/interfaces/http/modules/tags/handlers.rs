use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::interfaces::http::common::ApiResult;
use crate::interfaces::http::state::ApiState;

#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Distinct tags of the articles currently stored
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Tags",
    responses((status = 200, description = "All tags", body = TagsResponse))
)]
pub async fn list_tags(State(state): State<ApiState>) -> ApiResult<Json<TagsResponse>> {
    let tags = state.articles.tags().await?;
    Ok(Json(TagsResponse { tags }))
}
