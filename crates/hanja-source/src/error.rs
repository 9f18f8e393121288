//! Error types for the source readers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source file not found: {}", .0.display())]
  MissingSource(PathBuf),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("archive error: {0}")]
  Archive(#[from] zip::result::ZipError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
