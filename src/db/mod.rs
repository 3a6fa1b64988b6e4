//! Credential store for authgate
//!
//! User records live behind the [`UserStore`] trait. Postgres backs it in
//! deployments; the in-memory store serves local runs and tests.

pub mod memory;
pub mod models;
pub mod operations;

pub use memory::InMemoryUserStore;
pub use models::{NewUser, User};
pub use operations::{PgUserStore, UserStore};
