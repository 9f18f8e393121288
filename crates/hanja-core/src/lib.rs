//! Core types and trait definitions for the hanja knowledge base.
//!
//! This crate is deliberately free of file and database dependencies. The
//! source readers, the SQLite backend and the ETL pipeline all depend on it.

pub mod character;
pub mod error;
pub mod meaning;
pub mod store;

pub use error::{Error, Result};
