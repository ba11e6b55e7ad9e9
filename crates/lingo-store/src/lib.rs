//! # lingo-store
//!
//! SQLite persistence for the Lingo messaging service.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for users,
//! messages, and tasks.  Multi-row writes (thread replace, task replace)
//! run inside a single transaction so a crash mid-operation cannot leave
//! partial deletes behind.

pub mod database;
pub mod messages;
pub mod migrations;
pub mod tasks;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
