//! View composition: joins domain entities with viewer-relative data

pub mod composer;
pub mod model;

pub use composer::ViewComposer;
pub use model::{ArticleListView, ArticleView, CommentView, ProfileView};
