//! User domain entity

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// Registered account together with its side of the follow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Assigned by the directory on creation, monotonically increasing
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Ids of users following this user
    pub followers: BTreeSet<i64>,
    /// Ids of users this user follows
    pub followings: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `viewer_id` is among this user's followers.
    pub fn is_followed_by(&self, viewer_id: i64) -> bool {
        self.followers.contains(&viewer_id)
    }

    pub fn follows(&self, user_id: i64) -> bool {
        self.followings.contains(&user_id)
    }
}

/// Input for `UserRepository::create`; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "hash".into(),
            bio: None,
            image: None,
            followers: BTreeSet::from([2, 3]),
            followings: BTreeSet::from([4]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn follower_membership() {
        let u = sample_user();
        assert!(u.is_followed_by(2));
        assert!(!u.is_followed_by(4));
        assert!(u.follows(4));
        assert!(!u.follows(2));
    }
}
