//! Bulk loader: maps source entries onto store rows and writes them in
//! dependency order.
//!
//! Every write is an upsert on the table's natural key, so a re-run over the
//! same input converges on the same state. Store-assigned ids are recovered
//! after each parent table is written by reading the table back with
//! [`fetch_all`](crate::fetch::fetch_all).

use std::collections::{BTreeSet, HashMap};

use hanja_core::{
  character::{CharacterRecord, Decomposition, Reading},
  store::{Row, RowStore, Table},
};
use hanja_source::{IdsMap, SourceEntry};
use serde_json::{Value, json};

use crate::{Error, Result, fetch::id_map};

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn row<const N: usize>(pairs: [(&str, Value); N]) -> Row {
  pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

pub fn character_row(record: &CharacterRecord) -> Row {
  row([
    ("char", json!(record.character.to_string())),
    ("codepoint", json!(record.codepoint)),
    ("strokes", json!(record.strokes)),
    ("radical", json!(record.radical)),
    ("unihan_def", json!(record.gloss)),
  ])
}

pub fn reading_row(character_id: i64, reading: &Reading) -> Row {
  row([
    ("character_id", json!(character_id)),
    ("type", json!(reading.system)),
    ("value", json!(reading.value)),
    ("is_primary", json!(reading.is_primary)),
  ])
}

pub fn decomposition_row(character_id: i64, decomposition: &Decomposition) -> Row {
  let components: Vec<String> = decomposition.components.iter().map(char::to_string).collect();
  row([
    ("character_id", json!(character_id)),
    ("ids", json!(decomposition.ids)),
    ("components", json!(components)),
    ("confidence", json!(decomposition.confidence)),
  ])
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// Rows written per table by one [`Loader::load_all`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
  pub characters:       usize,
  pub readings:         usize,
  pub phonetic_classes: usize,
  pub links:            usize,
  pub decompositions:   usize,
}

pub struct Loader<'a, S> {
  store:      &'a S,
  batch_size: usize,
  page_size:  usize,
}

impl<'a, S: RowStore> Loader<'a, S> {
  pub fn new(store: &'a S, batch_size: usize, page_size: usize) -> Self {
    Self { store, batch_size: batch_size.max(1), page_size }
  }

  /// Upsert `rows` in batches; a failed batch aborts the stage with its
  /// index, leaving earlier batches in place.
  async fn write(&self, stage: &'static str, table: Table, rows: Vec<Row>) -> Result<usize> {
    let total = rows.len();
    let mut written = 0;
    for (index, batch) in rows.chunks(self.batch_size).enumerate() {
      self
        .store
        .upsert(table, batch.to_vec(), table.natural_key())
        .await
        .map_err(|e| Error::Batch { stage, index, source: Box::new(e) })?;
      written += batch.len();
      tracing::info!(stage, written, total, "batch written");
    }
    Ok(total)
  }

  /// Identity character → store id for every stored character.
  pub async fn character_ids(&self) -> Result<HashMap<String, i64>> {
    id_map(self.store, Table::Characters, "char", self.page_size).await
  }

  pub async fn load_characters(&self, entries: &[SourceEntry]) -> Result<usize> {
    let rows = entries
      .iter()
      .filter_map(SourceEntry::character_record)
      .map(|record| character_row(&record))
      .collect();
    self.write("characters", Table::Characters, rows).await
  }

  pub async fn load_readings(
    &self,
    entries: &[SourceEntry],
    character_ids: &HashMap<String, i64>,
  ) -> Result<usize> {
    let mut rows = Vec::new();
    for reading in entries.iter().flat_map(SourceEntry::readings) {
      let id = lookup(character_ids, Table::Characters, &reading.character.to_string())?;
      rows.push(reading_row(id, &reading));
    }
    self.write("readings", Table::Readings, rows).await
  }

  /// Write the distinct phonetic classes, then link each character to its
  /// class. Returns `(classes, links)`.
  pub async fn load_phonetic_classes(
    &self,
    entries: &[SourceEntry],
    character_ids: &HashMap<String, i64>,
  ) -> Result<(usize, usize)> {
    let codes: BTreeSet<&str> = entries.iter().filter_map(SourceEntry::phonetic_code).collect();
    let class_rows = codes.iter().map(|code| row([("code", json!(code))])).collect();
    let classes = self.write("phonetic classes", Table::PhoneticClasses, class_rows).await?;

    let class_ids = id_map(self.store, Table::PhoneticClasses, "code", self.page_size).await?;
    let mut link_rows = Vec::new();
    for entry in entries {
      let (Some(character), Some(code)) = (entry.character(), entry.phonetic_code()) else {
        continue;
      };
      link_rows.push(row([
        (
          "character_id",
          json!(lookup(character_ids, Table::Characters, &character.to_string())?),
        ),
        ("phonetic_class_id", json!(lookup(&class_ids, Table::PhoneticClasses, code)?)),
      ]));
    }
    let links = self
      .write("phonetic links", Table::CharacterPhoneticClass, link_rows)
      .await?;
    Ok((classes, links))
  }

  pub async fn load_decompositions(
    &self,
    entries: &[SourceEntry],
    ids: &IdsMap,
    character_ids: &HashMap<String, i64>,
  ) -> Result<usize> {
    let mut rows = Vec::new();
    for entry in entries {
      let Some(character) = entry.character() else { continue };
      let key = character.to_string();
      let Some(found) = ids.get(&key) else { continue };
      let Some(decomposition) = Decomposition::derived(character, &found.ids, &found.components)
      else {
        continue;
      };
      rows.push(decomposition_row(
        lookup(character_ids, Table::Characters, &key)?,
        &decomposition,
      ));
    }
    self.write("decompositions", Table::Decompositions, rows).await
  }

  /// Characters, then readings, phonetic classes and their links, then
  /// decompositions.
  pub async fn load_all(&self, entries: &[SourceEntry], ids: &IdsMap) -> Result<LoadSummary> {
    let characters = self.load_characters(entries).await?;
    let character_ids = self.character_ids().await?;
    tracing::info!(ids = character_ids.len(), "character ids reloaded");

    let readings = self.load_readings(entries, &character_ids).await?;
    let (phonetic_classes, links) = self.load_phonetic_classes(entries, &character_ids).await?;
    let decompositions = self.load_decompositions(entries, ids, &character_ids).await?;

    Ok(LoadSummary { characters, readings, phonetic_classes, links, decompositions })
  }
}

fn lookup(ids: &HashMap<String, i64>, table: Table, key: &str) -> Result<i64> {
  ids
    .get(key)
    .copied()
    .ok_or_else(|| Error::MissingId { table: table.name(), key: key.to_owned() })
}
