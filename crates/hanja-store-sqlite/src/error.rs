//! Error type for `hanja-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hanja_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Schema names are spliced into SQL, so only plain identifiers pass.
  #[error("invalid schema name: {0:?}")]
  InvalidSchema(String),

  #[error("upsert on {0} needs at least one conflict column")]
  MissingConflictKey(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
