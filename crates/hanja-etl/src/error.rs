//! Error type for the ETL pipeline.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("missing configuration value: {0}")]
  MissingConfig(&'static str),

  #[error("source error: {0}")]
  Source(#[from] hanja_source::Error),

  #[error("meaning tree error: {0}")]
  Core(#[from] hanja_core::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// A write batch failed; earlier batches of the stage stay committed.
  #[error("{stage}: batch {index} failed: {source}")]
  Batch {
    stage:  &'static str,
    index:  usize,
    #[source]
    source: BoxError,
  },

  #[error("{table} has no id for {key:?} after writing it")]
  MissingId { table: &'static str, key: String },

  #[error("{table} row lacks a usable {column:?} column")]
  MalformedRow { table: &'static str, column: &'static str },

  #[error("{character}: sense {slot:?} names unknown parent {parent:?}")]
  UnknownParent { character: char, slot: String, parent: String },

  #[error("{character}: sense {slot:?} has a parent but no relation")]
  MissingRelation { character: char, slot: String },

  #[error("template error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Wrap a backend error from any [`hanja_core::store::RowStore`].
  pub fn store<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
