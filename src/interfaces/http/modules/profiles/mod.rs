//! Profiles module - public profiles and the follow graph

pub mod handlers;

pub use handlers::*;
