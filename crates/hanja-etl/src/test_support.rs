//! A scripted [`RowStore`] for unit tests: one fixed row list served through
//! a response ceiling, with every call recorded.

use std::sync::Mutex;

use hanja_core::store::{Filter, Row, RowStore, Select, Table, WriteOp};
use serde_json::Value;

pub fn row(value: Value) -> Row {
  match value {
    Value::Object(map) => map,
    other => panic!("not an object: {other}"),
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Select { table: Table, offset: usize, limit: Option<usize> },
  Upsert { table: Table, rows: usize },
  Atomic { ops: usize },
  Other,
}

#[derive(Default)]
pub struct ScriptedStore {
  rows:       Vec<Row>,
  ceiling:    Option<usize>,
  /// Index (among write calls) of the first write that fails.
  fail_write: Option<usize>,
  calls:      Mutex<Vec<Call>>,
}

impl ScriptedStore {
  pub fn with_rows(rows: Vec<Row>) -> Self { Self { rows, ..Self::default() } }

  pub fn with_ceiling(mut self, ceiling: usize) -> Self {
    self.ceiling = Some(ceiling);
    self
  }

  pub fn failing_write(mut self, index: usize) -> Self {
    self.fail_write = Some(index);
    self
  }

  pub fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  /// `(offset, limit)` of every select, in order.
  pub fn windows(&self) -> Vec<(usize, usize)> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::Select { offset, limit, .. } => Some((offset, limit.unwrap_or(usize::MAX))),
        _ => None,
      })
      .collect()
  }

  fn write(&self, call: Call, affected: u64) -> std::io::Result<u64> {
    let mut calls = self.calls.lock().unwrap();
    let writes = calls.iter().filter(|c| !matches!(c, Call::Select { .. })).count();
    calls.push(call);
    if self.fail_write == Some(writes) {
      return Err(std::io::Error::other("scripted write failure"));
    }
    Ok(affected)
  }
}

impl RowStore for ScriptedStore {
  type Error = std::io::Error;

  async fn select(&self, table: Table, query: Select) -> std::io::Result<Vec<Row>> {
    self.calls.lock().unwrap().push(Call::Select {
      table,
      offset: query.offset,
      limit: query.limit,
    });
    let mut take = query.limit.unwrap_or(usize::MAX);
    if let Some(ceiling) = self.ceiling {
      take = take.min(ceiling);
    }
    Ok(self.rows.iter().skip(query.offset).take(take).cloned().collect())
  }

  async fn upsert(
    &self,
    table: Table,
    rows: Vec<Row>,
    _on_conflict: &'static [&'static str],
  ) -> std::io::Result<u64> {
    let affected = rows.len() as u64;
    self.write(Call::Upsert { table, rows: rows.len() }, affected)
  }

  async fn insert(&self, _table: Table, rows: Vec<Row>) -> std::io::Result<u64> {
    self.write(Call::Other, rows.len() as u64)
  }

  async fn update(&self, _table: Table, _filter: Filter, _patch: Row) -> std::io::Result<u64> {
    self.write(Call::Other, 0)
  }

  async fn delete(&self, _table: Table, _filter: Filter) -> std::io::Result<u64> {
    self.write(Call::Other, 0)
  }

  async fn atomic(&self, ops: Vec<WriteOp>) -> std::io::Result<u64> {
    self.write(Call::Atomic { ops: ops.len() }, 0)
  }
}
