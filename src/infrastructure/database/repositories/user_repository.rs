use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, NewUser, User, UserRepository};
use crate::infrastructure::database::entities::{follow, user};

use super::WriteLock;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
    writes: WriteLock,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_write_lock(db, WriteLock::default())
    }

    /// Share `writes` with the other repositories on the same pool.
    pub fn with_write_lock(db: DatabaseConnection, writes: WriteLock) -> Self {
        Self { db, writes }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

/// Attach both sides of the follow graph to a user row.
async fn load_user<C: ConnectionTrait>(conn: &C, model: user::Model) -> DomainResult<User> {
    let followers: BTreeSet<i64> = follow::Entity::find()
        .filter(follow::Column::FolloweeId.eq(model.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|f| f.follower_id)
        .collect();

    let followings: BTreeSet<i64> = follow::Entity::find()
        .filter(follow::Column::FollowerId.eq(model.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|f| f.followee_id)
        .collect();

    Ok(User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        bio: model.bio,
        image: model.image,
        followers,
        followings,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> DomainResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("user", "id", id))
}

/// Whether a user other than `except_id` already holds `value` in `column`.
async fn taken_by_other<C: ConnectionTrait>(
    conn: &C,
    column: user::Column,
    value: &str,
    except_id: Option<i64>,
) -> DomainResult<bool> {
    let mut query = user::Entity::find().filter(column.eq(value));
    if let Some(id) = except_id {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?.is_some())
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") {
        DomainError::AlreadyExists("username or email already exists".to_string())
    } else {
        e.into()
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;

        if taken_by_other(&txn, user::Column::Email, &new_user.email, None).await? {
            return Err(DomainError::AlreadyExists(format!(
                "user with email: {} already exists",
                new_user.email
            )));
        }
        if taken_by_other(&txn, user::Column::Username, &new_user.username, None).await? {
            return Err(DomainError::AlreadyExists(format!(
                "user with username: {} already exists",
                new_user.username
            )));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            bio: Set(None),
            image: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err)?;

        txn.commit().await?;

        debug!(user_id = model.id, "user stored");
        Ok(User {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            bio: model.bio,
            image: model.image,
            followers: BTreeSet::new(),
            followings: BTreeSet::new(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn update(&self, user: User) -> DomainResult<User> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;

        let existing = find_by_id(&txn, user.id).await?;

        if existing.email != user.email
            && taken_by_other(&txn, user::Column::Email, &user.email, Some(user.id)).await?
        {
            return Err(DomainError::AlreadyExists(format!(
                "user with email: {} already exists",
                user.email
            )));
        }
        if existing.username != user.username
            && taken_by_other(&txn, user::Column::Username, &user.username, Some(user.id)).await?
        {
            return Err(DomainError::AlreadyExists(format!(
                "user with username: {} already exists",
                user.username
            )));
        }

        let mut active: user::ActiveModel = existing.into();
        active.username = Set(user.username);
        active.email = Set(user.email);
        active.password_hash = Set(user.password_hash);
        active.bio = Set(user.bio);
        active.image = Set(user.image);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await.map_err(write_err)?;
        let updated = load_user(&txn, updated).await?;
        txn.commit().await?;

        Ok(updated)
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "email", email))?;
        load_user(&self.db, model).await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<User> {
        let model = find_by_id(&self.db, id).await?;
        load_user(&self.db, model).await
    }

    async fn get_by_username(&self, username: &str) -> DomainResult<User> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "username", username))?;
        load_user(&self.db, model).await
    }

    async fn add_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;
        find_by_id(&txn, follower_id).await?;
        find_by_id(&txn, followee_id).await?;

        let exists = follow::Entity::find_by_id((follower_id, followee_id))
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            follow::ActiveModel {
                follower_id: Set(follower_id),
                followee_id: Set(followee_id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn remove_follower(&self, follower_id: i64, followee_id: i64) -> DomainResult<()> {
        let _writer = self.writes.acquire().await;
        let txn = self.db.begin().await?;
        find_by_id(&txn, follower_id).await?;
        find_by_id(&txn, followee_id).await?;

        follow::Entity::delete_by_id((follower_id, followee_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }
}
