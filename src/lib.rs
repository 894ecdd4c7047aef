//! # Conduit
//!
//! Backend for a Medium-style blogging platform: users, profiles and
//! following, articles with tags and favorites, comments, and a feed.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities and the repository traits
//! - **application**: Use cases (`UserService`, `ArticleService`) and view composition
//! - **infrastructure**: In-memory and SeaORM repositories, password hashing, JWT
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Process bootstrap shared by the binary and the tests

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;
