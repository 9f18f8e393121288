//! The ETL orchestrator: parse, gate, load, verify.
//!
//! Stages run strictly in order. A failed pre-load gate stops the run before
//! any write; a failed post-load battery is reported after loading.

use std::{
  fmt,
  time::{Duration, Instant},
};

use hanja_core::store::RowStore;
use hanja_source::{
  IdsMap, SourceEntry, filter_target, read_ids, read_unihan, select_candidates,
};

use crate::{
  PipelineConfig, Result,
  curate::TemplateDocument,
  load::{LoadSummary, Loader},
  validate::{self, Report},
};

/// Parsed inputs: the learner subset and the decomposable-character map.
#[derive(Debug, Clone)]
pub struct Sources {
  /// Codepoints read from the archive before filtering.
  pub archive_size: usize,
  pub subset:       Vec<SourceEntry>,
  pub ids:          IdsMap,
}

impl Sources {
  /// Subset characters that have a decomposition.
  pub fn decomposable(&self) -> usize {
    self
      .subset
      .iter()
      .filter_map(SourceEntry::character)
      .filter(|c| self.ids.contains_key(c.to_string().as_str()))
      .count()
  }
}

/// Read both source files. Both must exist before either is parsed.
pub fn read_sources(config: &PipelineConfig) -> Result<Sources> {
  let archive = config.unihan_archive();
  let ids_file = config.ids_file();
  for path in [&archive, &ids_file] {
    if !path.is_file() {
      return Err(hanja_source::Error::MissingSource(path.clone()).into());
    }
  }

  let map = read_unihan(&archive)?;
  let subset = filter_target(&map, config.target_count);
  tracing::info!(codepoints = map.len(), subset = subset.len(), "dictionary archive parsed");
  let ids = read_ids(&ids_file)?;
  tracing::info!(decomposable = ids.len(), "structural descriptions parsed");

  Ok(Sources { archive_size: map.len(), subset, ids })
}

// ─── Run ─────────────────────────────────────────────────────────────────────

/// Everything a run produced, rendered as the final report.
#[derive(Debug, Clone)]
pub struct RunOutcome {
  pub subset:       usize,
  pub decomposable: usize,
  pub pre:          Report,
  /// `None` for dry runs and gated runs.
  pub load:         Option<LoadSummary>,
  pub post:         Option<Report>,
  pub elapsed:      Duration,
}

impl RunOutcome {
  /// Both batteries that ran passed.
  pub fn succeeded(&self) -> bool {
    self.pre.all_passed() && self.post.as_ref().is_none_or(Report::all_passed)
  }
}

fn verdict(passed: bool) -> &'static str { if passed { "PASS" } else { "FAIL" } }

impl fmt::Display for RunOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Pre-load validation:")?;
    write!(f, "{}", self.pre)?;
    if let Some(load) = &self.load {
      writeln!(f, "Loaded:")?;
      writeln!(f, "  characters:       {}", load.characters)?;
      writeln!(f, "  readings:         {}", load.readings)?;
      writeln!(f, "  phonetic classes: {}", load.phonetic_classes)?;
      writeln!(f, "  phonetic links:   {}", load.links)?;
      writeln!(f, "  decompositions:   {}", load.decompositions)?;
    }
    if let Some(post) = &self.post {
      writeln!(f, "Post-load validation:")?;
      write!(f, "{post}")?;
    }
    writeln!(f, "Summary:")?;
    writeln!(f, "  elapsed:        {:.1}s", self.elapsed.as_secs_f64())?;
    writeln!(f, "  characters:     {}", self.subset)?;
    writeln!(f, "  decomposable:   {}", self.decomposable)?;
    writeln!(f, "  pre-load:       {}", verdict(self.pre.all_passed()))?;
    match &self.post {
      Some(post) => writeln!(f, "  post-load:      {}", verdict(post.all_passed())),
      None => writeln!(f, "  post-load:      skipped"),
    }
  }
}

/// Parse and run the pre-load gate without touching a store.
pub fn dry_run(config: &PipelineConfig) -> Result<RunOutcome> {
  let started = Instant::now();
  let sources = read_sources(config)?;
  let pre = validate::pre_load(&sources.subset, &sources.ids, &config.thresholds());
  Ok(RunOutcome {
    subset: sources.subset.len(),
    decomposable: sources.decomposable(),
    pre,
    load: None,
    post: None,
    elapsed: started.elapsed(),
  })
}

/// The full pipeline against `store`.
pub async fn run<S: RowStore>(config: &PipelineConfig, store: &S) -> Result<RunOutcome> {
  let started = Instant::now();
  let sources = read_sources(config)?;
  let limits = config.thresholds();

  let pre = validate::pre_load(&sources.subset, &sources.ids, &limits);
  let mut outcome = RunOutcome {
    subset: sources.subset.len(),
    decomposable: sources.decomposable(),
    pre,
    load: None,
    post: None,
    elapsed: Duration::ZERO,
  };
  if !outcome.pre.all_passed() {
    tracing::error!("pre-load validation failed; nothing written");
    outcome.elapsed = started.elapsed();
    return Ok(outcome);
  }

  let loader = Loader::new(store, config.batch_size, config.page_size);
  outcome.load = Some(loader.load_all(&sources.subset, &sources.ids).await?);
  outcome.post = Some(validate::post_load(store, &limits, config.page_size).await?);
  outcome.elapsed = started.elapsed();
  Ok(outcome)
}

/// The post-load battery on its own.
pub async fn verify<S: RowStore>(config: &PipelineConfig, store: &S) -> Result<Report> {
  validate::post_load(store, &config.thresholds(), config.page_size).await
}

/// The pre-load battery on its own.
pub fn precheck(config: &PipelineConfig) -> Result<Report> {
  let sources = read_sources(config)?;
  Ok(validate::pre_load(&sources.subset, &sources.ids, &config.thresholds()))
}

// ─── Curation ────────────────────────────────────────────────────────────────

/// A curation template: blank entries for `chars` when given, otherwise the
/// ranked candidates from the learner subset.
pub fn template(config: &PipelineConfig, chars: &[char]) -> Result<TemplateDocument> {
  if !chars.is_empty() {
    tracing::info!(count = chars.len(), "template for listed characters");
    return Ok(TemplateDocument::from_chars(chars));
  }

  let sources = read_sources(config)?;
  let picked = select_candidates(&sources.subset, &sources.ids, config.selection_policy());
  let decomposable = picked.iter().filter(|c| c.decomposable).count();
  let mean_strokes = if picked.is_empty() {
    0.0
  } else {
    picked.iter().map(|c| f64::from(c.strokes)).sum::<f64>() / picked.len() as f64
  };
  tracing::info!(
    selected = picked.len(),
    decomposable,
    mean_strokes = %format!("{mean_strokes:.1}"),
    "curation candidates selected"
  );
  Ok(TemplateDocument::from_candidates(&picked))
}
