//! Conversions between JSON row values and SQLite column values.
//!
//! Booleans are stored as 0/1 integers and arrays or objects as compact JSON
//! text. Decoding reverses both for the columns known to hold them.

use hanja_core::store::{Row, Table};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::Result;

enum ColumnKind {
  Plain,
  Flag,
  Json,
}

fn column_kind(table: Table, column: &str) -> ColumnKind {
  match (table, column) {
    (Table::Readings, "is_primary") => ColumnKind::Flag,
    (Table::Decompositions, "components") => ColumnKind::Json,
    _ => ColumnKind::Plain,
  }
}

pub fn encode_value(value: &Value) -> Result<SqlValue> {
  Ok(match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or_default()),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(serde_json::to_string(value)?),
  })
}

pub fn decode_value(table: Table, column: &str, value: SqlValue) -> Result<Value> {
  Ok(match (column_kind(table, column), value) {
    (_, SqlValue::Null) => Value::Null,
    (ColumnKind::Flag, SqlValue::Integer(i)) => Value::Bool(i != 0),
    (ColumnKind::Json, SqlValue::Text(s)) => serde_json::from_str(&s)?,
    (_, SqlValue::Integer(i)) => Value::from(i),
    (_, SqlValue::Real(f)) => Value::from(f),
    (_, SqlValue::Text(s)) => Value::String(s),
    (_, SqlValue::Blob(b)) => Value::from(b),
  })
}

/// Zip projected column names with one result row.
pub fn decode_row(table: Table, columns: &[String], values: Vec<SqlValue>) -> Result<Row> {
  columns
    .iter()
    .zip(values)
    .map(|(column, value)| Ok((column.clone(), decode_value(table, column, value)?)))
    .collect()
}
