//! Comments module - comments under an article

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
