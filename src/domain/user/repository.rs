//! User directory interface

use async_trait::async_trait;

use super::model::{NewUser, User};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user with empty follow sets.
    /// Fails with `AlreadyExists` when the email or username is taken.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    /// Replace the profile fields of the user with `user.id`.
    ///
    /// Follower and following sets are kept as stored; whatever the caller
    /// passes in those fields is ignored.
    async fn update(&self, user: User) -> DomainResult<User>;

    async fn get_by_email(&self, email: &str) -> DomainResult<User>;

    async fn get_by_id(&self, id: i64) -> DomainResult<User>;

    async fn get_by_username(&self, username: &str) -> DomainResult<User>;

    /// Record that `follower_id` follows `followee_id`, updating both sides at once.
    async fn add_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()>;

    /// Remove the edge; a missing edge is not an error.
    async fn remove_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()>;
}
