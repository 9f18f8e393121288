//! Row-window fetch: read a whole table through a store that silently caps
//! each response.
//!
//! Windows of `page_size` rows are requested until one comes back short.
//! Rows appended between requests may be missed or duplicated; the loader
//! only reads tables it has finished writing.

use std::collections::HashMap;

use hanja_core::store::{Row, RowStore, Select, Table};

use crate::{Error, Result};

/// Every row of `table`, projected onto `columns`.
pub async fn fetch_all<S: RowStore>(
  store: &S,
  table: Table,
  columns: &[&str],
  page_size: usize,
) -> Result<Vec<Row>> {
  let page_size = page_size.max(1);
  let mut rows = Vec::new();
  let mut offset = 0;

  loop {
    let window = store
      .select(table, Select::columns(columns).window(offset, page_size))
      .await
      .map_err(Error::store)?;
    let fetched = window.len();
    rows.extend(window);
    if fetched < page_size {
      break;
    }
    offset += page_size;
  }

  tracing::debug!(%table, rows = rows.len(), "fetched table");
  Ok(rows)
}

/// Map each row's `key` text to its store-assigned `id`.
pub async fn id_map<S: RowStore>(
  store: &S,
  table: Table,
  key: &'static str,
  page_size: usize,
) -> Result<HashMap<String, i64>> {
  fetch_all(store, table, &["id", key], page_size)
    .await?
    .iter()
    .map(|row| -> Result<(String, i64)> {
      let identity = row
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or(Error::MalformedRow { table: table.name(), column: key })?;
      let id = row
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or(Error::MalformedRow { table: table.name(), column: "id" })?;
      Ok((identity.to_owned(), id))
    })
    .collect()
}
