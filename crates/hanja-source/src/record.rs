//! Normalisation of raw archive fields into domain records.

use std::collections::HashSet;

use hanja_core::character::{CharacterRecord, HANGUL_READING, PhoneticClass, Reading};

use crate::unihan::{
  Fields, GLOSS_FIELD, PHONETIC_FIELD, RADICAL_FIELD, READING_FIELD, STROKES_FIELD,
  codepoint_char,
};

/// Stroke rank given to entries whose stroke count is missing or unparsable.
pub const UNPARSED_STROKES: u32 = 99;

/// One codepoint's retained fields, as read from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
  /// The `U+XXXX` key.
  pub key:    String,
  pub fields: Fields,
}

impl SourceEntry {
  pub fn new(key: &str, fields: Fields) -> Self {
    Self { key: key.to_owned(), fields }
  }

  /// The identity character, or `None` for a malformed key.
  pub fn character(&self) -> Option<char> { codepoint_char(&self.key) }

  /// A non-empty field value.
  pub fn field(&self, name: &str) -> Option<&str> {
    self
      .fields
      .get(name)
      .map(String::as_str)
      .filter(|v| !v.trim().is_empty())
  }

  pub fn has_reading(&self) -> bool { self.field(READING_FIELD).is_some() }

  pub fn phonetic_code(&self) -> Option<&str> { self.field(PHONETIC_FIELD) }

  /// The total stroke count: the first whitespace-separated token, if it
  /// parses.
  pub fn strokes(&self) -> Option<u32> {
    self
      .field(STROKES_FIELD)?
      .split_whitespace()
      .next()?
      .parse()
      .ok()
  }

  /// [`Self::strokes`], or [`UNPARSED_STROKES`] for ranking and filtering.
  pub fn stroke_rank(&self) -> u32 { self.strokes().unwrap_or(UNPARSED_STROKES) }

  /// The radical number: the text before the first `.` of the radical field,
  /// without simplified-form `'` marks (`"85.8"` → `"85"`, `"120'.3"` →
  /// `"120"`).
  pub fn radical(&self) -> Option<String> {
    let raw = self.field(RADICAL_FIELD)?;
    let radical = raw.split('.').next()?.trim_end_matches('\'');
    (!radical.is_empty()).then(|| radical.to_owned())
  }

  /// The character row for this entry.
  pub fn character_record(&self) -> Option<CharacterRecord> {
    let mut record = CharacterRecord::new(self.character()?)
      .with_gloss(self.field(GLOSS_FIELD).unwrap_or_default());
    record.strokes = self.strokes();
    record.radical = self.radical();
    Some(record)
  }

  /// Every distinct hangul reading, annotation stripped (`"부:0N 불:0E"` →
  /// `부`, `불`). Values repeated under another annotation are kept once, at
  /// their first position. The first is primary.
  pub fn readings(&self) -> Vec<Reading> {
    let (Some(character), Some(raw)) = (self.character(), self.field(READING_FIELD)) else {
      return Vec::new();
    };
    let mut seen = HashSet::new();
    raw
      .split_whitespace()
      .filter_map(|token| token.split(':').next().filter(|v| !v.is_empty()))
      .filter(|value| seen.insert(*value))
      .enumerate()
      .map(|(index, value)| Reading {
        character,
        system: HANGUL_READING.to_owned(),
        value: value.to_owned(),
        is_primary: index == 0,
      })
      .collect()
  }

  /// The first reading value, used to pre-fill curation templates.
  pub fn primary_reading(&self) -> Option<String> {
    self.readings().into_iter().next().map(|r| r.value)
  }

  pub fn phonetic_class(&self) -> Option<PhoneticClass> {
    self.phonetic_code().map(|code| PhoneticClass { code: code.to_owned() })
  }
}
