//! Core types and trait definitions for apptrack.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It holds the domain model, input validation, the pure status resolver, and
//! the [`store::ApplicationStore`] trait that storage backends implement.

pub mod application;
pub mod error;
pub mod intake;
pub mod resolver;
pub mod statistics;
pub mod status;
pub mod store;
pub mod student;

pub use error::{Error, Result};
