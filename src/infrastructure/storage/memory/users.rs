use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{DomainError, DomainResult, NewUser, User, UserRepository};

#[derive(Default)]
struct UserTable {
    last_id: i64,
    users: HashMap<i64, User>,
    by_email: HashMap<String, i64>,
    by_username: HashMap<String, i64>,
}

impl UserTable {
    fn require(&self, id: i64) -> DomainResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found("user", "id", id))
        }
    }

    fn user_mut(&mut self, id: i64) -> DomainResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("user", "id", id))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let mut table = self.table.write().await;

        if table.by_email.contains_key(&new_user.email) {
            return Err(email_taken(&new_user.email));
        }
        if table.by_username.contains_key(&new_user.username) {
            return Err(username_taken(&new_user.username));
        }

        table.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.last_id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            bio: None,
            image: None,
            followers: BTreeSet::new(),
            followings: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };

        table.by_email.insert(user.email.clone(), user.id);
        table.by_username.insert(user.username.clone(), user.id);
        table.users.insert(user.id, user.clone());

        debug!(user_id = user.id, "user stored");
        Ok(user)
    }

    async fn update(&self, user: User) -> DomainResult<User> {
        let mut table = self.table.write().await;

        let Some(existing) = table.users.get(&user.id) else {
            return Err(DomainError::not_found("user", "id", user.id));
        };
        let old_email = existing.email.clone();
        let old_username = existing.username.clone();

        if old_email != user.email
            && table.by_email.get(&user.email).is_some_and(|&id| id != user.id)
        {
            return Err(email_taken(&user.email));
        }
        if old_username != user.username
            && table
                .by_username
                .get(&user.username)
                .is_some_and(|&id| id != user.id)
        {
            return Err(username_taken(&user.username));
        }

        table.by_email.remove(&old_email);
        table.by_email.insert(user.email.clone(), user.id);
        table.by_username.remove(&old_username);
        table.by_username.insert(user.username.clone(), user.id);

        let stored = table.user_mut(user.id)?;
        stored.username = user.username;
        stored.email = user.email;
        stored.password_hash = user.password_hash;
        stored.bio = user.bio;
        stored.image = user.image;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        let table = self.table.read().await;
        table
            .by_email
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", "email", email))
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<User> {
        let table = self.table.read().await;
        table
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", "id", id))
    }

    async fn get_by_username(&self, username: &str) -> DomainResult<User> {
        let table = self.table.read().await;
        table
            .by_username
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", "username", username))
    }

    async fn add_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()> {
        let mut table = self.table.write().await;
        table.require(follower_id)?;
        table.require(followee_id)?;

        table.user_mut(follower_id)?.followings.insert(followee_id);
        table.user_mut(followee_id)?.followers.insert(follower_id);
        Ok(())
    }

    async fn remove_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()> {
        let mut table = self.table.write().await;
        table.require(follower_id)?;
        table.require(followee_id)?;

        table.user_mut(follower_id)?.followings.remove(&followee_id);
        table.user_mut(followee_id)?.followers.remove(&follower_id);
        Ok(())
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::AlreadyExists(format!("user with email: {} already exists", email))
}

fn username_taken(username: &str) -> DomainError {
    DomainError::AlreadyExists(format!("user with username: {} already exists", username))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@x.com", name),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn ids_increase_per_user() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("alice")).await.unwrap();
        let b = repo.create(new_user("bob")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice")).await.unwrap();

        let mut dup = new_user("alice2");
        dup.email = "alice@x.com".into();
        let err = repo.create(dup).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn email_change_moves_the_lookup_key() {
        let repo = InMemoryUserRepository::new();
        let mut alice = repo.create(new_user("alice")).await.unwrap();
        alice.email = "alice@new.com".into();
        repo.update(alice).await.unwrap();

        assert!(repo.get_by_email("alice@x.com").await.unwrap_err().is_not_found());
        assert_eq!(repo.get_by_email("alice@new.com").await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn update_cannot_overwrite_follow_sets() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();
        repo.add_follower(bob.id, alice.id).await.unwrap();

        let mut stale = alice.clone();
        stale.bio = Some("hi".into());
        let updated = repo.update(stale).await.unwrap();

        assert_eq!(updated.bio.as_deref(), Some("hi"));
        assert!(updated.is_followed_by(bob.id));
    }

    #[tokio::test]
    async fn follow_with_unknown_user_changes_nothing() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(new_user("alice")).await.unwrap();

        let err = repo.add_follower(alice.id, 99).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.get_by_id(alice.id).await.unwrap().followings.is_empty());
    }
}
