//! HTTP REST API interfaces
//!
//! - `common`: error envelope and the validating JSON extractor
//! - `middleware`: token authentication (required and optional)
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;

pub use router::{create_api_router, ApiDoc};
pub use state::ApiState;
