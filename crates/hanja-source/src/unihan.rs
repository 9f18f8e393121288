//! Reader for the compressed dictionary archive.
//!
//! The archive holds several tab-separated member files whose data lines read
//! `U+XXXX <TAB> field <TAB> value`. Only a fixed set of members and fields is
//! kept; a later occurrence of the same (codepoint, field) pair overwrites an
//! earlier one.

use std::{
  collections::BTreeMap,
  fs::File,
  io::{BufRead, BufReader, Read, Seek},
  path::Path,
};

use crate::{Error, Result, record::SourceEntry};

/// Korean (hangul) reading.
pub const READING_FIELD: &str = "kHangul";
/// English short gloss.
pub const GLOSS_FIELD: &str = "kDefinition";
/// Phonetic-class (derivation series) code.
pub const PHONETIC_FIELD: &str = "kPhonetic";
/// Total stroke count.
pub const STROKES_FIELD: &str = "kTotalStrokes";
/// Radical plus residual stroke count, e.g. `85.8`.
pub const RADICAL_FIELD: &str = "kRSUnicode";

/// Fields retained from the archive; everything else is dropped on read.
pub const FIELDS: [&str; 5] = [
  READING_FIELD,
  GLOSS_FIELD,
  PHONETIC_FIELD,
  STROKES_FIELD,
  RADICAL_FIELD,
];

/// Archive members that carry the retained fields.
pub const MEMBERS: [&str; 3] = [
  "Unihan_Readings.txt",
  "Unihan_DictionaryLikeData.txt",
  "Unihan_IRGSources.txt",
];

/// Field name → raw value for one codepoint.
pub type Fields = BTreeMap<String, String>;

/// Codepoint key (`U+XXXX`) → retained fields.
pub type UnihanMap = BTreeMap<String, Fields>;

// ─── Reading ─────────────────────────────────────────────────────────────────

/// Read the archive at `path`.
///
/// A missing file is reported as [`Error::MissingSource`] before anything is
/// opened.
pub fn read_unihan(path: &Path) -> Result<UnihanMap> {
  if !path.is_file() {
    return Err(Error::MissingSource(path.to_path_buf()));
  }
  let file = File::open(path)?;
  read_archive(BufReader::new(file))
}

/// Read an archive from any seekable source.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<UnihanMap> {
  let mut archive = zip::ZipArchive::new(reader)?;
  let mut map = UnihanMap::new();

  for index in 0..archive.len() {
    let member = archive.by_index(index)?;
    let name = member.name().to_owned();
    if !MEMBERS.contains(&name.as_str()) {
      continue;
    }
    tracing::info!(member = %name, "parsing archive member");
    read_lines(BufReader::new(member), &mut map)?;
  }

  Ok(map)
}

/// Fold every data line of `reader` into `map`.
pub(crate) fn read_lines(reader: impl BufRead, map: &mut UnihanMap) -> Result<()> {
  for raw in reader.split(b'\n') {
    let raw = raw?;
    let line = String::from_utf8_lossy(&raw);
    if let Some((key, field, value)) = parse_line(&line) {
      map
        .entry(key.to_owned())
        .or_default()
        .insert(field.to_owned(), value.to_owned());
    }
  }
  Ok(())
}

/// Split a data line into `(key, field, value)`.
///
/// Comments, blank lines, lines with fewer than three columns and fields
/// outside [`FIELDS`] yield `None`.
fn parse_line(line: &str) -> Option<(&str, &str, &str)> {
  let line = line.trim_end();
  if line.is_empty() || line.starts_with('#') {
    return None;
  }
  let mut parts = line.split('\t');
  let (key, field, value) = (parts.next()?, parts.next()?, parts.next()?);
  FIELDS.contains(&field).then_some((key, field, value))
}

/// Decode a `U+XXXX` key into its character.
pub fn codepoint_char(key: &str) -> Option<char> {
  let hex = key.strip_prefix("U+")?;
  u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

// ─── Learner subset ──────────────────────────────────────────────────────────

/// Reduce the archive to the characters a Korean learner needs: those with a
/// hangul reading, fewest strokes first (unparsable counts sort last), at
/// most `count` of them. Ties go by ascending numeric codepoint, so
/// `U+4E00` precedes `U+20000`.
pub fn filter_target(map: &UnihanMap, count: usize) -> Vec<SourceEntry> {
  let mut entries: Vec<SourceEntry> = map
    .iter()
    .map(|(key, fields)| SourceEntry::new(key, fields.clone()))
    .filter(SourceEntry::has_reading)
    .collect();
  entries.sort_by_key(|e| (e.stroke_rank(), e.character().map_or(u32::MAX, u32::from)));
  entries.truncate(count);
  entries
}
