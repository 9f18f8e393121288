//! Coverage validator: the pre-load gate over parsed sources and the
//! post-load battery over the store.
//!
//! Each check is independent; a battery passes only if every check does.

use std::{
  collections::{BTreeMap, HashSet},
  fmt,
};

use hanja_core::store::{RowStore, Table};
use hanja_source::{IdsMap, SourceEntry};

use crate::{Result, fetch::fetch_all};

/// Limits the batteries measure against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
  pub expected_chars:        usize,
  pub min_ids_coverage:      f64,
  pub min_phonetic_coverage: f64,
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
  pub name:   &'static str,
  pub passed: bool,
  pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
  pub checks: Vec<Check>,
}

impl Report {
  pub fn add(&mut self, name: &'static str, passed: bool, detail: impl Into<String>) {
    self.checks.push(Check { name, passed, detail: detail.into() });
  }

  pub fn all_passed(&self) -> bool { self.checks.iter().all(|c| c.passed) }

  pub fn check(&self, name: &str) -> Option<&Check> { self.checks.iter().find(|c| c.name == name) }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for check in &self.checks {
      let mark = if check.passed { "PASS" } else { "FAIL" };
      writeln!(f, "  [{mark}] {}: {}", check.name, check.detail)?;
    }
    Ok(())
  }
}

fn ratio(part: usize, whole: usize) -> f64 {
  if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

fn coverage_detail(part: usize, whole: usize, minimum: f64) -> String {
  format!(
    "{:.1}% ({part}/{whole}, minimum {:.0}%)",
    ratio(part, whole) * 100.0,
    minimum * 100.0
  )
}

/// The first few items, for failure details.
fn sample<T: AsRef<str>>(items: &[T]) -> String {
  items.iter().take(3).map(|item| item.as_ref()).collect::<Vec<&str>>().join(", ")
}

// ─── Pre-load ────────────────────────────────────────────────────────────────

/// Checks run on the learner subset before anything is written.
pub fn pre_load(subset: &[SourceEntry], ids: &IdsMap, limits: &Thresholds) -> Report {
  let mut report = Report::default();
  let total = subset.len();

  report.add(
    "character count",
    total == limits.expected_chars,
    format!("{total} (expected {})", limits.expected_chars),
  );

  let decomposable = subset
    .iter()
    .filter_map(SourceEntry::character)
    .filter(|c| ids.contains_key(c.to_string().as_str()))
    .count();
  let ids_ratio = ratio(decomposable, total);
  report.add(
    "IDS coverage",
    total > 0 && ids_ratio >= limits.min_ids_coverage,
    coverage_detail(decomposable, total, limits.min_ids_coverage),
  );

  let phonetic = subset.iter().filter(|e| e.phonetic_code().is_some()).count();
  report.add(
    "phonetic coverage",
    total > 0 && ratio(phonetic, total) >= limits.min_phonetic_coverage,
    coverage_detail(phonetic, total, limits.min_phonetic_coverage),
  );

  let mut keys_by_char: BTreeMap<char, Vec<&str>> = BTreeMap::new();
  for entry in subset {
    if let Some(c) = entry.character() {
      keys_by_char.entry(c).or_default().push(&entry.key);
    }
  }
  let duplicates: Vec<String> = keys_by_char
    .iter()
    .filter(|(_, keys)| keys.len() > 1)
    .map(|(c, keys)| format!("{c} ({})", keys.join(", ")))
    .collect();
  report.add(
    "unique characters",
    duplicates.is_empty(),
    if duplicates.is_empty() {
      "no duplicates".to_owned()
    } else {
      format!("{} duplicated: {}", duplicates.len(), sample(&duplicates))
    },
  );

  let unread: Vec<&str> = subset
    .iter()
    .filter(|e| !e.has_reading())
    .map(|e| e.key.as_str())
    .collect();
  report.add(
    "readings present",
    unread.is_empty(),
    if unread.is_empty() {
      format!("all {total} have a hangul reading")
    } else {
      format!("{} missing, e.g. {}", unread.len(), sample(&unread))
    },
  );

  report
}

// ─── Post-load ───────────────────────────────────────────────────────────────

/// Checks run against the store after loading.
pub async fn post_load<S: RowStore>(
  store: &S,
  limits: &Thresholds,
  page_size: usize,
) -> Result<Report> {
  let characters = fetch_all(store, Table::Characters, &["id"], page_size).await?;
  let readings = fetch_all(store, Table::Readings, &["character_id"], page_size).await?;
  let decompositions = fetch_all(store, Table::Decompositions, &["character_id"], page_size).await?;
  let classes = fetch_all(store, Table::PhoneticClasses, &["id"], page_size).await?;

  let mut report = Report::default();
  let total = characters.len();

  report.add(
    "character count",
    total >= limits.expected_chars,
    format!("{total} (expected at least {})", limits.expected_chars),
  );

  let read: HashSet<i64> = readings
    .iter()
    .filter_map(|r| r.get("character_id").and_then(|v| v.as_i64()))
    .collect();
  let unread = characters
    .iter()
    .filter_map(|r| r.get("id").and_then(|v| v.as_i64()))
    .filter(|id| !read.contains(id))
    .count();
  report.add(
    "readings present",
    unread == 0,
    format!("{unread} characters without a reading"),
  );

  report.add(
    "decomposition coverage",
    total > 0 && ratio(decompositions.len(), total) >= limits.min_ids_coverage,
    coverage_detail(decompositions.len(), total, limits.min_ids_coverage),
  );

  report.add(
    "phonetic classes",
    !classes.is_empty(),
    format!("{} classes", classes.len()),
  );

  Ok(report)
}
