//! Meaning trees — per-character forests of senses linked by derivation
//! edges.
//!
//! Senses and edges are produced by manual curation only. A tree is written
//! as a unit: all senses and edges of one character are replaced together, so
//! the invariants below are checked on the whole tree before any write.

use std::{
  collections::{HashMap, HashSet, VecDeque},
  fmt,
  str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── RelationKind ────────────────────────────────────────────────────────────

/// How a child sense derives from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
  /// The meaning is applied to a wider range.
  Extension,
  /// The meaning moves to a different domain figuratively.
  Metaphor,
  /// The meaning is narrowed.
  Specialization,
}

impl RelationKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Extension => "extension",
      Self::Metaphor => "metaphor",
      Self::Specialization => "specialization",
    }
  }
}

impl fmt::Display for RelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RelationKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "extension" => Ok(Self::Extension),
      "metaphor" => Ok(Self::Metaphor),
      "specialization" => Ok(Self::Specialization),
      other => Err(Error::UnknownRelation(other.to_owned())),
    }
  }
}

// ─── Senses and edges ────────────────────────────────────────────────────────

/// One distinct sense of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningSense {
  /// Client-generated; edges reference senses by this id.
  pub sense_id:    Uuid,
  pub character:   char,
  pub label:       String,
  pub short_gloss: Option<String>,
  /// An illustrative usage example.
  pub example:     Option<String>,
  /// Display order; 1-based.
  pub sort_order:  u32,
}

/// A directed derivation from `parent` to `child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningEdge {
  pub character: char,
  pub parent:    Uuid,
  pub child:     Uuid,
  pub relation:  RelationKind,
}

// ─── MeaningTree ─────────────────────────────────────────────────────────────

/// All senses and edges of a single character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningTree {
  pub character: char,
  pub senses:    Vec<MeaningSense>,
  pub edges:     Vec<MeaningEdge>,
}

impl MeaningTree {
  /// Check the tree invariants and return the id of the root sense.
  ///
  /// Every sense and edge must belong to `self.character`, edges must connect
  /// known senses without self-loops, every sense but one must have exactly
  /// one parent, and every sense must be reachable from that root.
  pub fn validate(&self) -> Result<Uuid> {
    if self.senses.is_empty() {
      return Err(Error::EmptyTree(self.character));
    }

    let mut known = HashSet::with_capacity(self.senses.len());
    for sense in &self.senses {
      if sense.character != self.character {
        return Err(Error::CrossCharacter {
          expected: self.character,
          found:    sense.character,
        });
      }
      if !known.insert(sense.sense_id) {
        return Err(Error::DuplicateSense(sense.sense_id));
      }
    }

    let mut parent_of: HashMap<Uuid, Uuid> = HashMap::new();
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for edge in &self.edges {
      if edge.character != self.character {
        return Err(Error::CrossCharacter {
          expected: self.character,
          found:    edge.character,
        });
      }
      for id in [edge.parent, edge.child] {
        if !known.contains(&id) {
          return Err(Error::UnknownSense(id));
        }
      }
      if edge.parent == edge.child {
        return Err(Error::SelfLoop(edge.child));
      }
      if parent_of.insert(edge.child, edge.parent).is_some() {
        return Err(Error::MultipleParents(edge.child));
      }
      children.entry(edge.parent).or_default().push(edge.child);
    }

    let roots: Vec<Uuid> = self
      .senses
      .iter()
      .map(|s| s.sense_id)
      .filter(|id| !parent_of.contains_key(id))
      .collect();
    let &[root] = roots.as_slice() else {
      return Err(Error::RootCount(roots.len()));
    };

    // With one parent per non-root, anything unreachable from the root sits
    // on a cycle.
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
      for child in children.get(&id).into_iter().flatten() {
        if seen.insert(*child) {
          queue.push_back(*child);
        }
      }
    }
    if let Some(stray) = self.senses.iter().find(|s| !seen.contains(&s.sense_id)) {
      return Err(Error::Cycle(stray.sense_id));
    }

    Ok(root)
  }

  /// The sense with no incoming edge, if the tree has exactly one.
  pub fn root(&self) -> Option<&MeaningSense> {
    let children: HashSet<Uuid> = self.edges.iter().map(|e| e.child).collect();
    let mut roots = self.senses.iter().filter(|s| !children.contains(&s.sense_id));
    match (roots.next(), roots.next()) {
      (Some(root), None) => Some(root),
      _ => None,
    }
  }
}
