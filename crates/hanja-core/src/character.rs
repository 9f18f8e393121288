//! Character-level records derived from the dictionary sources.
//!
//! These are the normalised shapes the loader maps onto store rows. The
//! store assigns its own integer ids; outside the store a character is
//! identified by the ideograph itself.

use serde::{Deserialize, Serialize};

/// Confidence recorded on every automatically derived decomposition.
pub const AUTO_DECOMPOSITION_CONFIDENCE: u8 = 90;

/// Upper bound on the stored short gloss, in characters.
pub const MAX_GLOSS_CHARS: usize = 500;

/// Reading-system tag for Korean (hangul) readings.
pub const HANGUL_READING: &str = "kHangul";

// ─── CharacterRecord ─────────────────────────────────────────────────────────

/// One ideograph with its stroke and radical metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
  /// The identity character; unique across the curated set.
  pub character: char,
  pub codepoint: u32,
  pub strokes:   Option<u32>,
  pub radical:   Option<String>,
  /// English short gloss, at most [`MAX_GLOSS_CHARS`] characters.
  pub gloss:     String,
}

impl CharacterRecord {
  /// A record with only the identity set; the codepoint follows from it.
  pub fn new(character: char) -> Self {
    Self {
      character,
      codepoint: u32::from(character),
      strokes: None,
      radical: None,
      gloss: String::new(),
    }
  }

  /// Set the gloss, truncating to [`MAX_GLOSS_CHARS`].
  pub fn with_gloss(mut self, gloss: &str) -> Self {
    self.gloss = short_gloss(gloss);
    self
  }
}

/// `gloss` cut to at most [`MAX_GLOSS_CHARS`] characters.
pub fn short_gloss(gloss: &str) -> String { gloss.chars().take(MAX_GLOSS_CHARS).collect() }

// ─── Reading ─────────────────────────────────────────────────────────────────

/// A pronunciation of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
  pub character:  char,
  /// Reading-system tag, e.g. [`HANGUL_READING`].
  pub system:     String,
  /// The phonetic value with any trailing annotation stripped.
  pub value:      String,
  pub is_primary: bool,
}

// ─── PhoneticClass ───────────────────────────────────────────────────────────

/// A derivation-series code shared by characters with a common phonetic
/// component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhoneticClass {
  pub code: String,
}

// ─── Decomposition ───────────────────────────────────────────────────────────

/// The structural breakdown of one character into leaf components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decomposition {
  pub character:  char,
  /// The raw structural-description string.
  pub ids:        String,
  /// Leaf components in scan order; always two or more.
  pub components: Vec<char>,
  pub confidence: u8,
}

impl Decomposition {
  /// An automatically derived decomposition, or `None` when fewer than two
  /// components are available.
  pub fn derived(character: char, ids: &str, components: &[char]) -> Option<Self> {
    (components.len() >= 2).then(|| Self {
      character,
      ids: ids.to_owned(),
      components: components.to_vec(),
      confidence: AUTO_DECOMPOSITION_CONFIDENCE,
    })
  }
}
