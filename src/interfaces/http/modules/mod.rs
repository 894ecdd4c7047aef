pub mod articles;
pub mod comments;
pub mod health;
pub mod metrics;
pub mod profiles;
pub mod request_id;
pub mod tags;
pub mod users;
