//! Salary and expense record storage.
//!
//! [`storage::InMemoryStorage`], [`sqlite_storage::SqliteStorage`] and
//! [`postgres_storage::PostgresStorage`] implement the traits from
//! `fintrack-core`; [`backend::Backend`] picks one from configuration.

pub mod backend;
pub mod commands;
pub mod config;
pub mod postgres_storage;
pub mod render;
pub mod sqlite_storage;
pub mod storage;

pub use fintrack_core::{models, normalize};
