//! [`SqliteStore`] — the SQLite implementation of [`RowStore`].

use std::path::Path;

use hanja_core::store::{DEFAULT_ROW_CEILING, Filter, Row, RowStore, Select, Table, WriteOp};
use rusqlite::types::Value as SqlValue;

use crate::{
  Error, Result,
  encode::{decode_row, encode_value},
  schema::{is_valid_schema, schema_sql},
};

// ─── Statements ──────────────────────────────────────────────────────────────

/// SQL text plus its positional parameters, built before touching the
/// connection so validation errors never reach the database thread.
struct Statement {
  sql:    String,
  params: Vec<SqlValue>,
}

fn filter_clause(table: Table, filter: &Filter, params: &mut Vec<SqlValue>) -> Result<String> {
  table.check_columns([filter.column()])?;
  Ok(match filter {
    Filter::Eq(column, value) => {
      params.push(encode_value(value)?);
      format!("{column} = ?")
    }
    Filter::In(_, values) if values.is_empty() => "0".to_owned(),
    Filter::In(column, values) => {
      for value in values {
        params.push(encode_value(value)?);
      }
      format!("{column} IN ({})", vec!["?"; values.len()].join(", "))
    }
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hanja row store backed by a single SQLite file attached under the store
/// schema name.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  schema: String,
}

impl SqliteStore {
  /// Open (or create) a store at `path` under `schema` and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>, schema: &str) -> Result<Self> {
    let target = path.as_ref().to_string_lossy().into_owned();
    Self::attach(target, schema).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(schema: &str) -> Result<Self> {
    Self::attach(":memory:".to_owned(), schema).await
  }

  async fn attach(target: String, schema: &str) -> Result<Self> {
    if !is_valid_schema(schema) {
      return Err(Error::InvalidSchema(schema.to_owned()));
    }

    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let attach = format!("ATTACH DATABASE ?1 AS {schema}");
    let ddl = schema_sql(schema);

    conn
      .call(move |conn| {
        conn.execute(&attach, [target])?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;

    Ok(Self { conn, schema: schema.to_owned() })
  }

  pub fn schema(&self) -> &str { &self.schema }

  fn qualified(&self, table: Table) -> String { format!("{}.{}", self.schema, table.name()) }

  /// One `INSERT` per row; with `on_conflict`, rows matching those columns
  /// update the existing row instead.
  fn insert_statements(
    &self,
    table: Table,
    rows: &[Row],
    on_conflict: Option<&[&str]>,
  ) -> Result<Vec<Statement>> {
    if let Some(keys) = on_conflict {
      if keys.is_empty() {
        return Err(Error::MissingConflictKey(table.name()));
      }
      table.check_columns(keys.iter().copied())?;
    }

    let target = self.qualified(table);
    rows
      .iter()
      .map(|row| {
        table.check_columns(row.keys().map(String::as_str))?;
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let params = row.values().map(encode_value).collect::<Result<Vec<_>>>()?;

        let mut sql = format!(
          "INSERT INTO {target} ({}) VALUES ({})",
          columns.join(", "),
          vec!["?"; columns.len()].join(", "),
        );
        if let Some(keys) = on_conflict {
          let updates: Vec<String> = columns
            .iter()
            .filter(|c| !keys.contains(*c))
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();
          sql.push_str(&format!(" ON CONFLICT ({}) DO ", keys.join(", ")));
          if updates.is_empty() {
            sql.push_str("NOTHING");
          } else {
            sql.push_str(&format!("UPDATE SET {}", updates.join(", ")));
          }
        }

        Ok(Statement { sql, params })
      })
      .collect()
  }

  fn plan(&self, op: &WriteOp) -> Result<Vec<Statement>> {
    match op {
      WriteOp::Insert { table, rows } => self.insert_statements(*table, rows, None),
      WriteOp::Upsert { table, rows, on_conflict } => {
        self.insert_statements(*table, rows, Some(*on_conflict))
      }
      WriteOp::Update { table, filter, patch } => {
        table.check_columns(patch.keys().map(String::as_str))?;
        if patch.is_empty() {
          return Ok(Vec::new());
        }
        let mut params = patch.values().map(encode_value).collect::<Result<Vec<_>>>()?;
        let assignments: Vec<String> = patch.keys().map(|c| format!("{c} = ?")).collect();
        let condition = filter_clause(*table, filter, &mut params)?;
        Ok(vec![Statement {
          sql: format!(
            "UPDATE {} SET {} WHERE {condition}",
            self.qualified(*table),
            assignments.join(", "),
          ),
          params,
        }])
      }
      WriteOp::Delete { table, filter } => {
        let mut params = Vec::new();
        let condition = filter_clause(*table, filter, &mut params)?;
        Ok(vec![Statement {
          sql: format!("DELETE FROM {} WHERE {condition}", self.qualified(*table)),
          params,
        }])
      }
    }
  }

  /// Run `ops` inside a single transaction and return the affected row count.
  async fn execute(&self, ops: Vec<WriteOp>) -> Result<u64> {
    let statements = ops
      .iter()
      .map(|op| self.plan(op))
      .collect::<Result<Vec<_>>>()?
      .into_iter()
      .flatten()
      .collect::<Vec<_>>();

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut affected = 0u64;
        for statement in &statements {
          affected +=
            tx.execute(&statement.sql, rusqlite::params_from_iter(statement.params.iter()))? as u64;
        }
        tx.commit()?;
        Ok(affected)
      })
      .await?;

    Ok(affected)
  }
}

// ─── RowStore impl ───────────────────────────────────────────────────────────

impl RowStore for SqliteStore {
  type Error = Error;

  async fn select(&self, table: Table, query: Select) -> Result<Vec<Row>> {
    let columns: Vec<String> = if query.columns.is_empty() {
      table.columns().iter().map(|c| (*c).to_owned()).collect()
    } else {
      query.columns
    };
    table.check_columns(columns.iter().map(String::as_str))?;

    let mut params = Vec::new();
    let where_clause = match &query.filter {
      Some(filter) => format!("WHERE {}", filter_clause(table, filter, &mut params)?),
      None => String::new(),
    };
    params.push(SqlValue::Integer(query.limit.unwrap_or(DEFAULT_ROW_CEILING) as i64));
    params.push(SqlValue::Integer(query.offset as i64));

    let sql = format!(
      "SELECT {} FROM {} {where_clause} ORDER BY rowid LIMIT ? OFFSET ?",
      columns.join(", "),
      self.qualified(table),
    );
    let width = columns.len();

    let raws: Vec<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            (0..width)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|values| decode_row(table, &columns, values))
      .collect()
  }

  async fn upsert(
    &self,
    table: Table,
    rows: Vec<Row>,
    on_conflict: &'static [&'static str],
  ) -> Result<u64> {
    self.execute(vec![WriteOp::Upsert { table, rows, on_conflict }]).await
  }

  async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<u64> {
    self.execute(vec![WriteOp::Insert { table, rows }]).await
  }

  async fn update(&self, table: Table, filter: Filter, patch: Row) -> Result<u64> {
    self.execute(vec![WriteOp::Update { table, filter, patch }]).await
  }

  async fn delete(&self, table: Table, filter: Filter) -> Result<u64> {
    self.execute(vec![WriteOp::Delete { table, filter }]).await
  }

  async fn atomic(&self, ops: Vec<WriteOp>) -> Result<u64> { self.execute(ops).await }
}
