use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::CommentView;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCommentRequest {
    #[validate(nested)]
    pub comment: NewCommentBody,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewCommentBody {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub comment: CommentView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}
