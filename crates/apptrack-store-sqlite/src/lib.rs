//! SQLite backend for apptrack.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every store call executes on that one
//! connection, and every application write runs in a single transaction that
//! also recomputes the owning student's derived status.

mod encode;
mod reads;
mod schema;
mod store;
mod writes;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
