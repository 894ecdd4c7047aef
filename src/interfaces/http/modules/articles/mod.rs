//! Articles module - listing, feed, CRUD and favorites

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
