//! Identity: user management and authentication
//!
//! Contains the `UserService` which orchestrates the user-related
//! use-cases: registration, login, profile updates and following.

pub mod service;

pub use service::{RegisterUser, UserChanges, UserService};
