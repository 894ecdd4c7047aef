//! Shared building blocks for the HTTP handlers

pub mod api_error;
pub mod validated_json;

pub use api_error::{ApiError, ApiResult, ErrorBody, ErrorMessages};
pub use validated_json::ValidatedJson;
