//! The hanja knowledge-base ETL.
//!
//! - [`pipeline`] orchestrates a run: parse, pre-load gate, load, post-load
//!   battery.
//! - [`load`] maps source entries onto rows and writes them in dependency
//!   order.
//! - [`fetch`] reads whole tables through a response-capped store.
//! - [`validate`] holds both coverage batteries.
//! - [`curate`] produces curation templates and ingests finished meaning
//!   trees.
//!
//! Everything store-facing is generic over [`hanja_core::store::RowStore`].

pub mod config;
pub mod curate;
pub mod error;
pub mod fetch;
pub mod load;
pub mod pipeline;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use crate::config::PipelineConfig;
pub use error::{Error, Result};
