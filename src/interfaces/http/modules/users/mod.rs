//! Users module - registration, login and the current user

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
