//! User service: application-layer orchestration
//!
//! Registration, login, profile updates and the follow graph.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, DomainResult, NewUser, RepositoryProvider, User};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

/// Input for [`UserService::register`]; the password is plaintext.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update. `None` keeps the stored value.
///
/// `bio` and `image` are nullable, so `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Registration ────────────────────────────────────────────

    pub async fn register(&self, req: RegisterUser) -> DomainResult<User> {
        let password_hash = hash(&req.password)?;

        let user = self
            .repos
            .users()
            .create(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "New user registered");
        Ok(user)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials. An unknown email is `NotFound`; a wrong password
    /// is `IncorrectPassword`.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = self.repos.users().get_by_email(email).await?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(format!("failed to verify password: {}", e)))?;
        if !valid {
            return Err(DomainError::IncorrectPassword);
        }

        info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, id: i64) -> DomainResult<User> {
        self.repos.users().get_by_id(id).await
    }

    /// Public profile lookup; also used to turn usernames into ids.
    pub async fn get_profile(&self, username: &str) -> DomainResult<User> {
        self.repos.users().get_by_username(username).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Apply `changes` to the user. The password is re-hashed only when a new one is given.
    pub async fn update(&self, id: i64, changes: UserChanges) -> DomainResult<User> {
        let mut user = self.repos.users().get_by_id(id).await?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password) = changes.password {
            user.password_hash = hash(&password)?;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(image) = changes.image {
            user.image = image;
        }

        let user = self.repos.users().update(user).await?;
        info!(user_id = user.id, "User profile updated");
        Ok(user)
    }

    /// Make `follower_id` follow `username`; returns the followee as stored afterwards.
    pub async fn follow(&self, follower_id: i64, username: &str) -> DomainResult<User> {
        let followee = self.repos.users().get_by_username(username).await?;
        self.repos
            .users()
            .add_follower(follower_id, followee.id)
            .await?;

        info!(follower_id, followee_id = followee.id, "User followed");
        self.repos.users().get_by_id(followee.id).await
    }

    pub async fn unfollow(&self, follower_id: i64, username: &str) -> DomainResult<User> {
        let followee = self.repos.users().get_by_username(username).await?;
        self.repos
            .users()
            .remove_follower(follower_id, followee.id)
            .await?;

        info!(follower_id, followee_id = followee.id, "User unfollowed");
        self.repos.users().get_by_id(followee.id).await
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn hash(password: &str) -> DomainResult<String> {
    hash_password(password)
        .map_err(|e| DomainError::Internal(format!("failed to hash password: {}", e)))
}
