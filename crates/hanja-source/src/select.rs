//! Candidate selection for manual meaning-tree curation.
//!
//! Candidates must have a hangul reading and at most
//! [`SelectionPolicy::max_strokes`] strokes. Decomposable characters rank
//! first, then fewer strokes; remaining ties keep input order.

use crate::{ids::IdsMap, record::SourceEntry};

/// Bounds applied by [`select_candidates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
  pub target_count: usize,
  /// Inclusive stroke ceiling.
  pub max_strokes:  u32,
}

impl Default for SelectionPolicy {
  fn default() -> Self { Self { target_count: 300, max_strokes: 12 } }
}

/// A selected character together with the keys it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
  pub entry:        &'a SourceEntry,
  pub character:    char,
  pub strokes:      u32,
  pub decomposable: bool,
}

/// Rank `entries` and keep the first `policy.target_count`.
pub fn select_candidates<'a>(
  entries: &'a [SourceEntry],
  ids: &IdsMap,
  policy: SelectionPolicy,
) -> Vec<Candidate<'a>> {
  let mut candidates: Vec<Candidate<'a>> = entries
    .iter()
    .filter(|entry| entry.has_reading())
    .filter_map(|entry| {
      let character = entry.character()?;
      let strokes = entry.stroke_rank();
      (strokes <= policy.max_strokes).then(|| Candidate {
        entry,
        character,
        strokes,
        decomposable: ids.contains_key(character.to_string().as_str()),
      })
    })
    .collect();

  // Stable: equal keys keep their input order.
  candidates.sort_by_key(|c| (!c.decomposable, c.strokes));
  candidates.truncate(policy.target_count);
  candidates
}

#[cfg(test)]
mod tests {
  use crate::{
    ids::IdsEntry,
    unihan::{READING_FIELD, STROKES_FIELD},
  };

  use super::*;

  fn entry(character: char, reading: Option<&str>, strokes: Option<&str>) -> SourceEntry {
    let mut fields = crate::unihan::Fields::new();
    if let Some(r) = reading {
      fields.insert(READING_FIELD.to_owned(), r.to_owned());
    }
    if let Some(s) = strokes {
      fields.insert(STROKES_FIELD.to_owned(), s.to_owned());
    }
    SourceEntry::new(&format!("U+{:04X}", u32::from(character)), fields)
  }

  fn ids_for(chars: &[char]) -> IdsMap {
    chars
      .iter()
      .map(|c| {
        (c.to_string(), IdsEntry { ids: format!("⿰{c}{c}"), components: vec![*c, *c] })
      })
      .collect()
  }

  fn policy(target_count: usize) -> SelectionPolicy {
    SelectionPolicy { target_count, max_strokes: 12 }
  }

  #[test]
  fn decomposable_ranks_before_fewer_strokes() {
    let entries = vec![
      entry('一', Some("일"), Some("1")),
      entry('清', Some("청"), Some("11")),
      entry('二', Some("이"), Some("2")),
      entry('明', Some("명"), Some("8")),
    ];
    let ids = ids_for(&['清', '明']);

    let picked: Vec<char> = select_candidates(&entries, &ids, policy(10))
      .iter()
      .map(|c| c.character)
      .collect();
    assert_eq!(picked, vec!['明', '清', '一', '二']);
  }

  #[test]
  fn excludes_missing_reading_and_heavy_characters() {
    let entries = vec![
      entry('一', None, Some("1")),
      entry('語', Some("어"), Some("14")),
      entry('九', Some("구"), None),
      entry('人', Some("인"), Some("2")),
    ];
    let picked = select_candidates(&entries, &IdsMap::new(), policy(10));
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].character, '人');
  }

  #[test]
  fn ties_keep_input_order_and_truncate() {
    let entries = vec![
      entry('人', Some("인"), Some("2")),
      entry('入', Some("입"), Some("2")),
      entry('八', Some("팔"), Some("2")),
    ];
    let picked: Vec<char> = select_candidates(&entries, &IdsMap::new(), policy(2))
      .iter()
      .map(|c| c.character)
      .collect();
    assert_eq!(picked, vec!['人', '入']);
  }

  #[test]
  fn repeated_selection_is_identical() {
    let entries: Vec<SourceEntry> = "一二三四五六七八九十清明林"
      .chars()
      .enumerate()
      .map(|(i, c)| entry(c, Some("가"), Some(&((i % 7) + 1).to_string())))
      .collect();
    let ids = ids_for(&['清', '明', '林']);

    let first = select_candidates(&entries, &ids, policy(8));
    let second = select_candidates(&entries, &ids, policy(8));
    assert_eq!(first, second);
  }

  #[test]
  fn ordering_respects_priority_keys() {
    let entries: Vec<SourceEntry> = "一二三四五六七八九十清明林"
      .chars()
      .enumerate()
      .map(|(i, c)| entry(c, Some("가"), Some(&((i * 5 % 12) + 1).to_string())))
      .collect();
    let ids = ids_for(&['三', '清', '九']);

    let picked = select_candidates(&entries, &ids, policy(100));
    for pair in picked.windows(2) {
      let (a, b) = (&pair[0], &pair[1]);
      assert!(a.decomposable >= b.decomposable);
      if a.decomposable == b.decomposable {
        assert!(a.strokes <= b.strokes);
      }
    }
  }
}
