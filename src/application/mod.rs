//! Application layer - use cases over the repository traits

pub mod identity;
pub mod publishing;
pub mod views;

pub use identity::{RegisterUser, UserChanges, UserService};
pub use publishing::{ArticleService, FeedRequest, ListArticles};
pub use views::{ArticleListView, ArticleView, CommentView, ProfileView, ViewComposer};
