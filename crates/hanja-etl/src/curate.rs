//! Meaning-tree curation: the template document handed to curators and the
//! ingest of finished entries.
//!
//! A template holds one entry per character with three sense slots (a root
//! and two children). Curators fill labels and flip `status` to `DONE`;
//! ingest turns each finished entry into a [`MeaningTree`], validates it, and
//! replaces that character's stored tree in one atomic unit.

use std::{collections::BTreeMap, fs, path::Path};

use chrono::{DateTime, Utc};
use hanja_core::{
  character::short_gloss,
  meaning::{MeaningEdge, MeaningSense, MeaningTree, RelationKind},
  store::{Filter, Row, RowStore, Table, WriteOp},
};
use hanja_source::{Candidate, unihan::GLOSS_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{Error, Result, fetch::id_map};

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurationStatus {
  #[default]
  Todo,
  InProgress,
  Done,
}

/// One sense slot; `id` is local to its entry (`s1`, `s2`, …).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SenseSlot {
  pub id:          String,
  #[serde(default)]
  pub label:       String,
  #[serde(default)]
  pub short_gloss: String,
  #[serde(default)]
  pub example:     String,
  #[serde(default)]
  pub parent_id:   Option<String>,
  #[serde(default)]
  pub relation:    Option<RelationKind>,
  #[serde(rename = "_note", default, skip_serializing_if = "Option::is_none")]
  pub note:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
  #[serde(rename = "char")]
  pub character:  char,
  #[serde(default)]
  pub hangul:     String,
  /// Dictionary gloss; written back to the character when non-empty.
  #[serde(default)]
  pub unihan_def: String,
  #[serde(default)]
  pub status:     CurationStatus,
  #[serde(default)]
  pub senses:     Vec<SenseSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
  pub purpose:        String,
  pub how_to:         String,
  pub relation_types: BTreeMap<String, String>,
  pub example:        TemplateEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
  #[serde(rename = "_instructions")]
  pub instructions: Instructions,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub generated_at: Option<DateTime<Utc>>,
  pub count:        usize,
  pub chars:        Vec<TemplateEntry>,
}

fn slot(id: &str, parent: Option<&str>, relation: Option<RelationKind>, note: &str) -> SenseSlot {
  SenseSlot {
    id: id.to_owned(),
    parent_id: parent.map(str::to_owned),
    relation,
    note: Some(note.to_owned()),
    ..SenseSlot::default()
  }
}

/// A root slot and two child slots, all blank.
pub fn blank_slots() -> Vec<SenseSlot> {
  vec![
    slot("s1", None, None, "root sense (the most basic meaning)"),
    slot("s2", Some("s1"), Some(RelationKind::Extension), "extended from s1"),
    slot("s3", Some("s1"), Some(RelationKind::Metaphor), "figurative use of s1"),
  ]
}

fn worked_example() -> TemplateEntry {
  let filled = |id: &str, parent: Option<&str>, relation, label: &str, gloss: &str, ex: &str| {
    SenseSlot {
      id: id.to_owned(),
      label: label.to_owned(),
      short_gloss: gloss.to_owned(),
      example: ex.to_owned(),
      parent_id: parent.map(str::to_owned),
      relation,
      note: None,
    }
  };
  TemplateEntry {
    character:  '清',
    hangul:     "청".to_owned(),
    unihan_def: String::new(),
    status:     CurationStatus::Done,
    senses:     vec![
      filled("s1", None, None, "맑다 (정화)", "물이 맑고 깨끗한 상태", "清水(청수)"),
      filled(
        "s2",
        Some("s1"),
        Some(RelationKind::Extension),
        "깨끗하다 (청결)",
        "더럽지 않고 깨끗한 상태",
        "清潔(청결)",
      ),
      filled(
        "s3",
        Some("s1"),
        Some(RelationKind::Metaphor),
        "맑다 (소리)",
        "소리가 맑고 청아한",
        "清音(청음)",
      ),
    ],
  }
}

fn instructions() -> Instructions {
  let relation_types = [
    (RelationKind::Extension, "the meaning is applied to a wider range"),
    (RelationKind::Metaphor, "the meaning moves figuratively to another domain"),
    (RelationKind::Specialization, "the meaning is narrowed"),
  ]
  .into_iter()
  .map(|(kind, text)| (kind.to_string(), text.to_owned()))
  .collect();

  Instructions {
    purpose: "meaning tree curation input".to_owned(),
    how_to: "Fill the senses of each character and set status to DONE when finished. \
             Senses left without a label are ignored."
      .to_owned(),
    relation_types,
    example: worked_example(),
  }
}

impl TemplateDocument {
  pub fn new(chars: Vec<TemplateEntry>) -> Self {
    Self {
      instructions: instructions(),
      generated_at: Some(Utc::now()),
      count: chars.len(),
      chars,
    }
  }

  /// Entries pre-filled from ranked candidates.
  pub fn from_candidates(candidates: &[Candidate<'_>]) -> Self {
    Self::new(
      candidates
        .iter()
        .map(|c| TemplateEntry {
          character:  c.character,
          hangul:     c.entry.primary_reading().unwrap_or_default(),
          unihan_def: c.entry.field(GLOSS_FIELD).unwrap_or_default().to_owned(),
          status:     CurationStatus::Todo,
          senses:     blank_slots(),
        })
        .collect(),
    )
  }

  /// Blank entries for hand-picked characters.
  pub fn from_chars(chars: &[char]) -> Self {
    Self::new(
      chars
        .iter()
        .map(|c| TemplateEntry {
          character:  *c,
          hangul:     String::new(),
          unihan_def: String::new(),
          status:     CurationStatus::Todo,
          senses:     blank_slots(),
        })
        .collect(),
    )
  }

  pub fn read(path: &Path) -> Result<Self> { Ok(serde_json::from_str(&fs::read_to_string(path)?)?) }

  pub fn write(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(self)?)?;
    Ok(())
  }
}

// ─── Entry → tree ────────────────────────────────────────────────────────────

/// Build the tree a finished entry describes, with fresh sense ids.
///
/// Slots without a label are dropped; `None` when none remain. The tree is
/// validated before it is returned.
pub fn entry_tree(entry: &TemplateEntry) -> Result<Option<MeaningTree>> {
  let character = entry.character;
  let kept: Vec<&SenseSlot> = entry.senses.iter().filter(|s| !s.label.trim().is_empty()).collect();
  if kept.is_empty() {
    return Ok(None);
  }

  let ids: BTreeMap<&str, Uuid> = kept.iter().map(|s| (s.id.as_str(), Uuid::new_v4())).collect();
  let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_owned());

  let mut senses = Vec::with_capacity(kept.len());
  let mut edges = Vec::new();
  for (index, slot) in kept.iter().enumerate() {
    let sense_id = ids[slot.id.as_str()];
    senses.push(MeaningSense {
      sense_id,
      character,
      label: slot.label.trim().to_owned(),
      short_gloss: non_empty(&slot.short_gloss),
      example: non_empty(&slot.example),
      sort_order: index as u32 + 1,
    });

    let Some(parent) = slot.parent_id.as_deref().filter(|p| !p.is_empty()) else {
      continue;
    };
    let parent_id = *ids.get(parent).ok_or_else(|| Error::UnknownParent {
      character,
      slot: slot.id.clone(),
      parent: parent.to_owned(),
    })?;
    let relation = slot
      .relation
      .ok_or_else(|| Error::MissingRelation { character, slot: slot.id.clone() })?;
    edges.push(MeaningEdge { character, parent: parent_id, child: sense_id, relation });
  }

  let tree = MeaningTree { character, senses, edges };
  tree.validate()?;
  Ok(Some(tree))
}

// ─── Ingest ──────────────────────────────────────────────────────────────────

/// Outcome of [`ingest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationSummary {
  /// Characters whose tree was replaced.
  pub written: usize,
  /// `DONE` entries with no labelled sense.
  pub empty:   usize,
  /// Entries not yet `DONE`.
  pub pending: usize,
  /// `DONE` characters absent from the store.
  pub unknown: Vec<char>,
}

fn sense_row(character_id: i64, sense: &MeaningSense) -> Row {
  let mut row = Row::new();
  row.insert("id".into(), json!(sense.sense_id.to_string()));
  row.insert("character_id".into(), json!(character_id));
  row.insert("label".into(), json!(sense.label));
  row.insert("short_gloss".into(), json!(sense.short_gloss));
  row.insert("example".into(), json!(sense.example));
  row.insert("sort_order".into(), json!(sense.sort_order));
  row
}

fn edge_row(character_id: i64, edge: &MeaningEdge) -> Row {
  let mut row = Row::new();
  row.insert("id".into(), json!(Uuid::new_v4().to_string()));
  row.insert("character_id".into(), json!(character_id));
  row.insert("parent_sense_id".into(), json!(edge.parent.to_string()));
  row.insert("child_sense_id".into(), json!(edge.child.to_string()));
  row.insert("relation".into(), json!(edge.relation.as_str()));
  row.insert("note".into(), Value::Null);
  row
}

/// The write unit replacing one character's tree: edges, then senses, are
/// cleared before the new senses and edges go in.
pub fn replace_tree_ops(character_id: i64, tree: &MeaningTree, gloss: &str) -> Vec<WriteOp> {
  let mut ops = Vec::with_capacity(5);
  if !gloss.trim().is_empty() {
    let mut patch = Row::new();
    patch.insert("unihan_def".into(), json!(short_gloss(gloss.trim())));
    ops.push(WriteOp::Update {
      table: Table::Characters,
      filter: Filter::eq("id", character_id),
      patch,
    });
  }
  ops.extend([
    WriteOp::Delete { table: Table::MeaningEdges, filter: Filter::eq("character_id", character_id) },
    WriteOp::Delete { table: Table::MeaningSenses, filter: Filter::eq("character_id", character_id) },
    WriteOp::Insert {
      table: Table::MeaningSenses,
      rows:  tree.senses.iter().map(|s| sense_row(character_id, s)).collect(),
    },
    WriteOp::Insert {
      table: Table::MeaningEdges,
      rows:  tree.edges.iter().map(|e| edge_row(character_id, e)).collect(),
    },
  ]);
  ops
}

/// Write every `DONE` entry of `document`.
///
/// All finished entries are turned into trees first, so a malformed entry
/// aborts the ingest before anything is written.
pub async fn ingest<S: RowStore>(
  store: &S,
  document: &TemplateDocument,
  page_size: usize,
) -> Result<CurationSummary> {
  let mut summary = CurationSummary::default();
  let mut trees = Vec::new();
  for entry in &document.chars {
    if entry.status != CurationStatus::Done {
      summary.pending += 1;
      continue;
    }
    match entry_tree(entry)? {
      Some(tree) => trees.push((entry, tree)),
      None => summary.empty += 1,
    }
  }

  let character_ids = id_map(store, Table::Characters, "char", page_size).await?;
  for (entry, tree) in trees {
    let Some(&character_id) = character_ids.get(&entry.character.to_string()) else {
      tracing::warn!(character = %entry.character, "not in store; skipped");
      summary.unknown.push(entry.character);
      continue;
    };
    store
      .atomic(replace_tree_ops(character_id, &tree, &entry.unihan_def))
      .await
      .map_err(Error::store)?;
    tracing::info!(
      character = %entry.character,
      senses = tree.senses.len(),
      edges = tree.edges.len(),
      "meaning tree written"
    );
    summary.written += 1;
  }

  Ok(summary)
}
