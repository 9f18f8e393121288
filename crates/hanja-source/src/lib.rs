//! Readers and pure transforms over the two dictionary sources.
//!
//! - [`unihan`] decodes the compressed dictionary archive into per-codepoint
//!   field maps and reduces it to the learner subset.
//! - [`ids`] reads structural descriptions and extracts leaf components.
//! - [`record`] normalises raw fields into [`hanja_core::character`] records.
//! - [`select`] ranks the learner subset into a bounded curation set.
//!
//! Pure synchronous; no database dependencies. Malformed source lines are
//! skipped, never reported.

pub mod error;
pub mod ids;
pub mod record;
pub mod select;
pub mod unihan;

pub use error::{Error, Result};
pub use ids::{IdsEntry, IdsMap, extract_components, read_ids};
pub use record::SourceEntry;
pub use select::{Candidate, SelectionPolicy, select_candidates};
pub use unihan::{Fields, UnihanMap, codepoint_char, filter_target, read_unihan};
