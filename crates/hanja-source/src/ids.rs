//! Structural-description (IDS) reader and leaf-component extractor.
//!
//! Lines read `ordinal <TAB> character <TAB> description [<TAB> alternate…]`.
//! Only the first description is used. Extraction is flat: operators are
//! dropped and the remaining ideographs are kept in scan order, so the
//! grouping an operator implies is not reconstructed.

use std::{
  collections::HashMap,
  fs::File,
  io::{BufRead, BufReader},
  ops::RangeInclusive,
  path::Path,
};

use crate::{Error, Result};

/// Ideographic description characters, including the Unicode 15.1
/// additions.
pub const IDS_OPERATORS: [char; 17] = [
  '⿰', '⿱', '⿲', '⿳', '⿴', '⿵', '⿶', '⿷', '⿸', '⿹', '⿺', '⿻', '⿼', '⿽', '⿾', '⿿',
  '㇯',
];

/// Blocks a leaf component may come from.
pub const IDEOGRAPH_RANGES: [RangeInclusive<u32>; 5] = [
  0x4E00..=0x9FFF, // CJK Unified Ideographs
  0x3400..=0x4DBF, // Extension A
  0x2E80..=0x2EFF, // CJK Radicals Supplement
  0x2F00..=0x2FDF, // Kangxi Radicals
  0x31C0..=0x31EF, // CJK Strokes
];

/// A successfully decomposed character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdsEntry {
  /// The description the components were taken from.
  pub ids:        String,
  /// Two or more leaves, in scan order.
  pub components: Vec<char>,
}

/// Character → decomposition, holding decomposable characters only.
pub type IdsMap = HashMap<String, IdsEntry>;

/// Whether `c` falls in one of the [`IDEOGRAPH_RANGES`].
pub fn is_ideograph(c: char) -> bool {
  let cp = u32::from(c);
  IDEOGRAPH_RANGES.iter().any(|r| r.contains(&cp))
}

/// The leaf components of `ids`, or an empty vector when fewer than two
/// survive.
///
/// ```
/// use hanja_source::extract_components;
///
/// assert_eq!(extract_components("⿰氵青"), vec!['氵', '青']);
/// assert!(extract_components("⿰亻a").is_empty());
/// ```
pub fn extract_components(ids: &str) -> Vec<char> {
  let leaves: Vec<char> = ids
    .chars()
    .filter(|c| !IDS_OPERATORS.contains(c))
    .filter(|c| is_ideograph(*c))
    .collect();
  if leaves.len() >= 2 { leaves } else { Vec::new() }
}

/// Read the description file at `path`.
pub fn read_ids(path: &Path) -> Result<IdsMap> {
  if !path.is_file() {
    return Err(Error::MissingSource(path.to_path_buf()));
  }
  parse_ids(BufReader::new(File::open(path)?))
}

/// Parse descriptions from any line source, keeping decomposable characters.
pub fn parse_ids(reader: impl BufRead) -> Result<IdsMap> {
  let mut map = IdsMap::new();
  for raw in reader.split(b'\n') {
    let raw = raw?;
    let line = String::from_utf8_lossy(&raw);
    if let Some((character, entry)) = parse_line(&line) {
      map.insert(character.to_owned(), entry);
    }
  }
  Ok(map)
}

fn parse_line(line: &str) -> Option<(&str, IdsEntry)> {
  let line = line.trim();
  if line.is_empty() || line.starts_with('#') {
    return None;
  }
  let mut parts = line.split('\t');
  let (_ordinal, character, ids) = (parts.next()?, parts.next()?, parts.next()?);
  let components = extract_components(ids);
  (!components.is_empty()).then(|| {
    (character, IdsEntry { ids: ids.to_owned(), components })
  })
}
