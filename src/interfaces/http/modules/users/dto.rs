//! User DTOs

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{RegisterUser, UserChanges};
use crate::domain::User;

/// `POST /api/users` body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(nested)]
    pub user: NewUserBody,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewUserBody {
    #[validate(length(min = 4, max = 50, message = "must be 4 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "must be 6 to 72 characters"))]
    pub password: String,
}

impl From<NewUserBody> for RegisterUser {
    fn from(b: NewUserBody) -> Self {
        Self {
            username: b.username,
            email: b.email,
            password: b.password,
        }
    }
}

/// `POST /api/users/login` body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(nested)]
    pub user: LoginBody,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginBody {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub password: String,
}

/// `PUT /api/user` body. Absent fields are kept; `bio` and `image` may be `null` to clear them.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(nested)]
    pub user: UserChangesBody,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UserChangesBody {
    #[validate(length(min = 4, max = 50, message = "must be 4 to 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 72, message = "must be 6 to 72 characters"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

impl From<UserChangesBody> for UserChanges {
    fn from(b: UserChangesBody) -> Self {
        Self {
            username: b.username,
            email: b.email,
            password: b.password,
            bio: b.bio,
            image: b.image,
        }
    }
}

/// A present key becomes `Some`, so `null` reads as `Some(None)` and absence as `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The authenticated user as returned to its owner
#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserView {
    pub fn new(user: User, token: String) -> Self {
        Self {
            email: user.email,
            token,
            username: user.username,
            bio: user.bio,
            image: user.image,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserView,
}
