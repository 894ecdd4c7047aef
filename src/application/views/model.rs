//! Response shapes produced by the view composer

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

/// Public view of a user relative to the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProfileView {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Whether the viewer follows this user; false for anonymous viewers
    pub following: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: u64,
    pub author: ProfileView,
}

/// One page of articles. `articles_count` is the number of matches before pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListView {
    pub articles: Vec<ArticleView>,
    pub articles_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub body: String,
    #[serde(serialize_with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
    pub author: ProfileView,
}

fn rfc3339_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn article_view_uses_wire_names() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let view = ArticleView {
            slug: "hello-world".into(),
            title: "Hello World".into(),
            description: "d".into(),
            body: "b".into(),
            tag_list: vec!["rust".into()],
            created_at: ts,
            updated_at: ts,
            favorited: true,
            favorites_count: 1,
            author: ProfileView {
                username: "alice".into(),
                bio: None,
                image: None,
                following: false,
            },
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tagList"][0], "rust");
        assert_eq!(json["favoritesCount"], 1);
        assert_eq!(json["createdAt"], "2024-05-01T12:30:00.000Z");
        assert_eq!(json["author"]["following"], false);
        assert!(json["author"]["bio"].is_null());
    }
}
