//! Shared fixture: a small dictionary archive and description file written
//! into a temporary data directory.

#![allow(dead_code)]

use std::{fs::File, io::Write as _, path::Path};

use hanja_core::store::{Row, RowStore, Table};
use hanja_etl::{PipelineConfig, fetch::fetch_all};
use hanja_store_sqlite::SqliteStore;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// `(character, hangul, strokes, gloss, phonetic, radical, description)`.
pub const CHARACTERS: [(char, &str, &str, &str, &str, &str, &str); 10] = [
  ('清', "청:0E", "11", "clear, pure, clean", "1206", "85.8", "⿰氵青"),
  ('明', "명:0E", "8", "bright, light, brilliant", "907", "72.4", "⿰日月"),
  ('林', "림:0E 임:0N", "8", "forest, grove", "804", "75.4", "⿰木木"),
  ('休', "휴:0E", "6", "rest, stop", "1118", "9.4", "⿰亻木"),
  ('好', "호:0E", "6", "good, excellent, fine", "470", "38.3", "⿰女子"),
  ('男', "남:0E", "7", "male, man", "931", "102.2", "⿱田力"),
  ('安', "안:0E", "6", "peaceful, tranquil", "5", "40.3", "⿱宀女"),
  ('字', "자:0E", "6", "letter, character, word", "1", "39.3", "⿱宀子"),
  ('森', "삼:0E", "12", "forest; luxuriant vegetation", "1113", "75.8", "⿱木⿰木木"),
  ('一', "일:0E", "1", "one; a, an; alone", "", "1.0", "一"),
];

pub const CHARACTER_COUNT: usize = CHARACTERS.len();

fn key(c: char) -> String { format!("U+{:04X}", u32::from(c)) }

fn write_archive(path: &Path) {
  let mut readings = String::from("# Unihan_Readings.txt\n#\n");
  let mut dictionary = String::from("# Unihan_DictionaryLikeData.txt\n");
  let mut sources = String::from("# Unihan_IRGSources.txt\n");

  for (c, hangul, strokes, gloss, phonetic, radical, _) in CHARACTERS {
    let k = key(c);
    readings.push_str(&format!("{k}\tkHangul\t{hangul}\n{k}\tkDefinition\t{gloss}\n"));
    readings.push_str(&format!("{k}\tkMandarin\tx\n"));
    if !phonetic.is_empty() {
      dictionary.push_str(&format!("{k}\tkPhonetic\t{phonetic}\n"));
    }
    sources.push_str(&format!("{k}\tkTotalStrokes\t{strokes}\n{k}\tkRSUnicode\t{radical}\n"));
  }
  // No hangul reading: never part of the learner subset.
  readings.push_str("U+4E02\tkDefinition\tobstruction of breath\n");
  sources.push_str("U+4E02\tkTotalStrokes\t2\n");

  let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
  for (name, body) in [
    ("Unihan_Readings.txt", readings),
    ("Unihan_DictionaryLikeData.txt", dictionary),
    ("Unihan_IRGSources.txt", sources),
    ("Unihan_Variants.txt", "U+6E05\tkSemanticVariant\tU+6DF8\n".to_owned()),
  ] {
    zip.start_file(name, SimpleFileOptions::default()).unwrap();
    zip.write_all(body.as_bytes()).unwrap();
  }
  zip.finish().unwrap();
}

fn write_ids(path: &Path) {
  let mut text = String::from("# IDS fixture\n");
  for (c, .., ids) in CHARACTERS {
    text.push_str(&format!("{}\t{c}\t{ids}\n", key(c)));
  }
  std::fs::write(path, text).unwrap();
}

/// A data directory holding both sources, and a config reading from it.
pub fn fixture() -> (TempDir, PipelineConfig) {
  let dir = TempDir::new().unwrap();
  write_archive(&dir.path().join("Unihan.zip"));
  write_ids(&dir.path().join("ids.txt"));

  let config = PipelineConfig {
    data_dir: dir.path().to_path_buf(),
    target_count: CHARACTER_COUNT,
    expected_char_count: CHARACTER_COUNT,
    batch_size: 4,
    page_size: 3,
    ..PipelineConfig::default()
  };
  (dir, config)
}

pub async fn store() -> SqliteStore { SqliteStore::open_in_memory("hanja").await.unwrap() }

pub async fn all(store: &SqliteStore, table: Table) -> Vec<Row> {
  fetch_all(store, table, table.columns(), 1000).await.unwrap()
}

pub async fn character_id(store: &SqliteStore, c: char) -> i64 {
  all(store, Table::Characters)
    .await
    .into_iter()
    .find(|r| r["char"] == c.to_string().as_str())
    .and_then(|r| r["id"].as_i64())
    .unwrap()
}

/// Row count of every table, in [`Table::ALL`] order.
pub async fn counts<S: RowStore>(store: &S) -> Vec<usize> {
  let mut counts = Vec::new();
  for table in Table::ALL {
    counts.push(fetch_all(store, table, table.columns(), 1000).await.unwrap().len());
  }
  counts
}
