//! Pipeline configuration.
//!
//! Read from a TOML file (default `hanja.toml`, optional) layered under
//! `HANJA_*` environment variables. Every key has a default except
//! `store_path`, which store-touching commands require.

use std::path::{Path, PathBuf};

use hanja_source::SelectionPolicy;
use serde::Deserialize;

use crate::{Error, Result, validate::Thresholds};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Directory the source paths default into.
  pub data_dir:              PathBuf,
  /// Defaults to `<data_dir>/Unihan.zip`.
  pub unihan_archive:        Option<PathBuf>,
  /// Defaults to `<data_dir>/ids.txt`.
  pub ids_file:              Option<PathBuf>,
  pub store_path:            Option<PathBuf>,
  /// Namespace the store tables live under.
  pub schema:                String,
  /// Size of the learner subset taken from the archive.
  pub target_count:          usize,
  /// Exact subset size the pre-load gate demands; lower bound after load.
  pub expected_char_count:   usize,
  pub min_ids_coverage:      f64,
  pub min_phonetic_coverage: f64,
  /// Rows per upsert request.
  pub batch_size:            usize,
  /// Rows per window when reading tables back.
  pub page_size:             usize,
  pub curation_count:        usize,
  pub max_strokes:           u32,
  /// Defaults to `<data_dir>/meaning_tree_input.json`.
  pub template_path:         Option<PathBuf>,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      data_dir:              PathBuf::from("data"),
      unihan_archive:        None,
      ids_file:              None,
      store_path:            None,
      schema:                "hanja".to_owned(),
      target_count:          2000,
      expected_char_count:   2000,
      min_ids_coverage:      0.85,
      min_phonetic_coverage: 0.90,
      batch_size:            100,
      page_size:             1000,
      curation_count:        300,
      max_strokes:           12,
      template_path:         None,
    }
  }
}

impl PipelineConfig {
  /// Layer `path` (if present) and the `HANJA_*` environment over the
  /// defaults.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("HANJA"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn unihan_archive(&self) -> PathBuf {
    self
      .unihan_archive
      .clone()
      .unwrap_or_else(|| self.data_dir.join("Unihan.zip"))
  }

  pub fn ids_file(&self) -> PathBuf {
    self
      .ids_file
      .clone()
      .unwrap_or_else(|| self.data_dir.join("ids.txt"))
  }

  pub fn template_path(&self) -> PathBuf {
    self
      .template_path
      .clone()
      .unwrap_or_else(|| self.data_dir.join("meaning_tree_input.json"))
  }

  /// The store location, or [`Error::MissingConfig`].
  pub fn store_path(&self) -> Result<&Path> {
    self
      .store_path
      .as_deref()
      .ok_or(Error::MissingConfig("store_path"))
  }

  pub fn thresholds(&self) -> Thresholds {
    Thresholds {
      expected_chars:        self.expected_char_count,
      min_ids_coverage:      self.min_ids_coverage,
      min_phonetic_coverage: self.min_phonetic_coverage,
    }
  }

  pub fn selection_policy(&self) -> SelectionPolicy {
    SelectionPolicy { target_count: self.curation_count, max_strokes: self.max_strokes }
  }
}
