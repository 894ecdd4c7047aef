//! In-process storage backend

pub mod memory;

pub use memory::{InMemoryArticleRepository, InMemoryRepositoryProvider, InMemoryUserRepository};
