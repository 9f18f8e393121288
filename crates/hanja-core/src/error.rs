//! Error types for `hanja-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("meaning tree for {0} has no senses")]
  EmptyTree(char),

  #[error("sense {0} appears twice in the same tree")]
  DuplicateSense(Uuid),

  #[error("edge references unknown sense {0}")]
  UnknownSense(Uuid),

  #[error("sense or edge belongs to {found}, not {expected}")]
  CrossCharacter { expected: char, found: char },

  #[error("sense {0} cannot derive from itself")]
  SelfLoop(Uuid),

  #[error("sense {0} has more than one parent")]
  MultipleParents(Uuid),

  #[error("meaning tree must have exactly one root, found {0}")]
  RootCount(usize),

  #[error("meaning tree contains a cycle through {0}")]
  Cycle(Uuid),

  #[error("unknown relation kind: {0:?}")]
  UnknownRelation(String),

  #[error("table {table} has no column {column:?}")]
  UnknownColumn { table: &'static str, column: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
