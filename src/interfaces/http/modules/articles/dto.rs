//! Article DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::ArticleView;
use crate::domain::{ArticleChanges, ArticleDraft};

/// Filters and window for `GET /api/articles`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListArticlesQuery {
    /// Only articles carrying this tag
    pub tag: Option<String>,
    /// Only articles written by this username
    pub author: Option<String>,
    /// Only articles favorited by this username
    pub favorited: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Window for `GET /api/articles/feed`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateArticleRequest {
    #[validate(nested)]
    pub article: NewArticleBody,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewArticleBody {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub description: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

impl From<NewArticleBody> for ArticleDraft {
    fn from(b: NewArticleBody) -> Self {
        Self {
            title: b.title,
            description: b.description,
            body: b.body,
            tags: b.tag_list.into_iter().collect(),
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateArticleRequest {
    #[validate(nested)]
    pub article: ArticleChangesBody,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleChangesBody {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl From<ArticleChangesBody> for ArticleChanges {
    fn from(b: ArticleChangesBody) -> Self {
        Self {
            title: b.title,
            description: b.description,
            body: b.body,
            tags: b.tag_list.map(|tags| tags.into_iter().collect()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub article: ArticleView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_is_camel_case_and_optional() {
        let req: CreateArticleRequest = serde_json::from_str(
            r#"{"article":{"title":"T","description":"D","body":"B","tagList":["b","a","b"]}}"#,
        )
        .unwrap();
        let draft = ArticleDraft::from(req.article);
        assert_eq!(draft.tags.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);

        let bare: CreateArticleRequest =
            serde_json::from_str(r#"{"article":{"title":"T","description":"D","body":"B"}}"#).unwrap();
        assert!(bare.article.tag_list.is_empty());
    }

    #[test]
    fn blank_update_fields_are_rejected() {
        let req: UpdateArticleRequest =
            serde_json::from_str(r#"{"article":{"title":""}}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateArticleRequest = serde_json::from_str(r#"{"article":{}}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(ArticleChanges::from(req.article).tags.is_none());
    }
}
