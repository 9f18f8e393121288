//! The `RowStore` trait and supporting query types.
//!
//! The store is a schema-namespaced relational backend addressed one table at
//! a time. Rows travel as JSON objects; the store assigns integer ids to
//! `characters`, `readings` and `phonetic_classes`. Higher layers
//! (`hanja-etl`) depend on this abstraction, not on any concrete backend.

use std::{fmt, future::Future};

use serde_json::Value;

use crate::{Error, Result};

/// A single row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Rows returned by a `select` without an explicit limit.
pub const DEFAULT_ROW_CEILING: usize = 1000;

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Every table the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  Characters,
  Readings,
  PhoneticClasses,
  CharacterPhoneticClass,
  Decompositions,
  MeaningSenses,
  MeaningEdges,
}

impl Table {
  pub const ALL: [Table; 7] = [
    Table::Characters,
    Table::Readings,
    Table::PhoneticClasses,
    Table::CharacterPhoneticClass,
    Table::Decompositions,
    Table::MeaningSenses,
    Table::MeaningEdges,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Characters => "characters",
      Self::Readings => "readings",
      Self::PhoneticClasses => "phonetic_classes",
      Self::CharacterPhoneticClass => "character_phonetic_class",
      Self::Decompositions => "decompositions",
      Self::MeaningSenses => "meaning_senses",
      Self::MeaningEdges => "meaning_edges",
    }
  }

  /// Every column of the table, in definition order.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Characters => &["id", "char", "codepoint", "strokes", "radical", "unihan_def"],
      Self::Readings => &["id", "character_id", "type", "value", "is_primary"],
      Self::PhoneticClasses => &["id", "code"],
      Self::CharacterPhoneticClass => &["character_id", "phonetic_class_id"],
      Self::Decompositions => &["character_id", "ids", "components", "confidence"],
      Self::MeaningSenses => {
        &["id", "character_id", "label", "short_gloss", "example", "sort_order"]
      }
      Self::MeaningEdges => {
        &["id", "character_id", "parent_sense_id", "child_sense_id", "relation", "note"]
      }
    }
  }

  /// The columns that identify a row across pipeline runs; upserts resolve
  /// conflicts on these.
  pub fn natural_key(self) -> &'static [&'static str] {
    match self {
      Self::Characters => &["char"],
      Self::Readings => &["character_id", "type", "value"],
      Self::PhoneticClasses => &["code"],
      Self::CharacterPhoneticClass => &["character_id", "phonetic_class_id"],
      Self::Decompositions => &["character_id"],
      Self::MeaningSenses | Self::MeaningEdges => &["id"],
    }
  }

  /// Reject any column name the table does not define.
  pub fn check_columns<'a>(self, columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for column in columns {
      if !self.columns().contains(&column) {
        return Err(Error::UnknownColumn { table: self.name(), column: column.to_owned() });
      }
    }
    Ok(())
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// A row predicate for `select`, `update` and `delete`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  Eq(String, Value),
  In(String, Vec<Value>),
}

impl Filter {
  pub fn eq(column: &str, value: impl Into<Value>) -> Self {
    Self::Eq(column.to_owned(), value.into())
  }

  pub fn column(&self) -> &str {
    match self {
      Self::Eq(c, _) | Self::In(c, _) => c,
    }
  }
}

/// Parameters for [`RowStore::select`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
  /// Projected columns; empty means all.
  pub columns: Vec<String>,
  pub filter:  Option<Filter>,
  pub offset:  usize,
  /// Window size; the store applies [`DEFAULT_ROW_CEILING`] when `None`.
  pub limit:   Option<usize>,
}

impl Select {
  pub fn columns(columns: &[&str]) -> Self {
    Self {
      columns: columns.iter().map(|c| (*c).to_owned()).collect(),
      ..Self::default()
    }
  }

  /// Restrict to the contiguous window `[offset, offset + limit)`.
  pub fn window(mut self, offset: usize, limit: usize) -> Self {
    self.offset = offset;
    self.limit = Some(limit);
    self
  }

  pub fn filter(mut self, filter: Filter) -> Self {
    self.filter = Some(filter);
    self
  }
}

/// A single write, used to batch several writes into one atomic unit.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
  Insert { table: Table, rows: Vec<Row> },
  Upsert { table: Table, rows: Vec<Row>, on_conflict: &'static [&'static str] },
  Update { table: Table, filter: Filter, patch: Row },
  Delete { table: Table, filter: Filter },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store the pipeline loads into.
///
/// Every method addresses one table within the store's schema. Writes return
/// the number of affected rows.
pub trait RowStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read rows matching `query`. At most `query.limit` rows come back, or
  /// [`DEFAULT_ROW_CEILING`] when no limit is set.
  fn select(
    &self,
    table: Table,
    query: Select,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Insert `rows`, updating the existing row instead whenever the
  /// `on_conflict` columns match.
  fn upsert(
    &self,
    table: Table,
    rows: Vec<Row>,
    on_conflict: &'static [&'static str],
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Append `rows` unconditionally.
  fn insert(
    &self,
    table: Table,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Apply `patch` to every row matching `filter`.
  fn update(
    &self,
    table: Table,
    filter: Filter,
    patch: Row,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete every row matching `filter`.
  fn delete(
    &self,
    table: Table,
    filter: Filter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Run `ops` in order as one all-or-nothing unit.
  fn atomic(
    &self,
    ops: Vec<WriteOp>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn natural_keys_are_real_columns() {
    for table in Table::ALL {
      table.check_columns(table.natural_key().iter().copied()).unwrap();
    }
  }

  #[test]
  fn unknown_column_is_rejected() {
    let err = Table::Characters.check_columns(["char", "pinyin"]).unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { table: "characters", ref column } if column == "pinyin"));
  }

  #[test]
  fn window_sets_offset_and_limit() {
    let q = Select::columns(&["id", "char"]).window(2000, 1000);
    assert_eq!(q.offset, 2000);
    assert_eq!(q.limit, Some(1000));
    assert_eq!(q.columns, vec!["id", "char"]);
  }
}
