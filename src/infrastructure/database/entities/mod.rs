//! SeaORM entities for the relational backend

pub mod article;
pub mod article_tag;
pub mod comment;
pub mod favorite;
pub mod follow;
pub mod tag;
pub mod user;
