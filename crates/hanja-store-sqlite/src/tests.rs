//! Integration tests for `SqliteStore` against an in-memory database.

use hanja_core::store::{DEFAULT_ROW_CEILING, Filter, Row, RowStore, Select, Table, WriteOp};
use serde_json::{Value, json};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory("hanja")
    .await
    .expect("in-memory store")
}

fn row(value: Value) -> Row {
  match value {
    Value::Object(map) => map,
    other => panic!("not an object: {other}"),
  }
}

fn character(c: char, gloss: &str) -> Row {
  row(json!({
    "char": c.to_string(),
    "codepoint": u32::from(c),
    "strokes": 11,
    "radical": "85",
    "unihan_def": gloss,
  }))
}

async fn id_of(s: &SqliteStore, c: char) -> i64 {
  let rows = s
    .select(
      Table::Characters,
      Select::columns(&["id"]).filter(Filter::eq("char", c.to_string())),
    )
    .await
    .unwrap();
  rows[0]["id"].as_i64().unwrap()
}

// ─── Opening ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejects_unsafe_schema_names() {
  for bad in ["", "1abc", "hanja; DROP TABLE x", "main"] {
    let err = SqliteStore::open_in_memory(bad).await.err().unwrap();
    assert!(matches!(err, Error::InvalidSchema(_)), "{bad:?}");
  }
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
  let dir = tempfile::TempDir::new().unwrap();
  let path = dir.path().join("hanja.db");

  {
    let s = SqliteStore::open(&path, "hanja").await.unwrap();
    s.upsert(Table::Characters, vec![character('清', "clear")], &["char"])
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path, "hanja").await.unwrap();
  let rows = s.select(Table::Characters, Select::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["char"], json!("清"));
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_on_identity_does_not_duplicate() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('清', "clear")], &["char"])
    .await
    .unwrap();
  let first_id = id_of(&s, '清').await;

  s.upsert(
    Table::Characters,
    vec![character('清', "clear, pure"), character('一', "one")],
    &["char"],
  )
  .await
  .unwrap();

  let rows = s.select(Table::Characters, Select::default()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(id_of(&s, '清').await, first_id);
  assert_eq!(rows[0]["unihan_def"], json!("clear, pure"));
}

#[tokio::test]
async fn upsert_with_only_key_columns_does_nothing_on_conflict() {
  let s = store().await;
  let class = || row(json!({ "code": "1206" }));
  s.upsert(Table::PhoneticClasses, vec![class()], &["code"]).await.unwrap();
  s.upsert(Table::PhoneticClasses, vec![class()], &["code"]).await.unwrap();

  let rows = s.select(Table::PhoneticClasses, Select::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn upsert_rejects_unknown_columns() {
  let s = store().await;
  let mut bad = character('清', "clear");
  bad.insert("pinyin".into(), json!("qing"));

  let err = s
    .upsert(Table::Characters, vec![bad], &["char"])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(hanja_core::Error::UnknownColumn { .. })));
}

// ─── Select ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_applies_window_and_default_ceiling() {
  let s = store().await;
  let rows: Vec<Row> = (0..(DEFAULT_ROW_CEILING as u32 + 5))
    .map(|i| row(json!({ "code": format!("{i}") })))
    .collect();
  s.upsert(Table::PhoneticClasses, rows, &["code"]).await.unwrap();

  let capped = s.select(Table::PhoneticClasses, Select::default()).await.unwrap();
  assert_eq!(capped.len(), DEFAULT_ROW_CEILING);

  let tail = s
    .select(
      Table::PhoneticClasses,
      Select::columns(&["code"]).window(DEFAULT_ROW_CEILING, DEFAULT_ROW_CEILING),
    )
    .await
    .unwrap();
  assert_eq!(tail.len(), 5);
  assert_eq!(tail[0]["code"], json!(DEFAULT_ROW_CEILING.to_string()));
  assert_eq!(tail[0].len(), 1);
}

#[tokio::test]
async fn decomposition_components_read_back_as_array() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('清', "clear")], &["char"])
    .await
    .unwrap();
  let id = id_of(&s, '清').await;

  let decomposition = row(json!({
    "character_id": id,
    "ids": "⿰氵青",
    "components": ["氵", "青"],
    "confidence": 90,
  }));
  s.upsert(Table::Decompositions, vec![decomposition.clone()], &["character_id"])
    .await
    .unwrap();
  s.upsert(Table::Decompositions, vec![decomposition], &["character_id"])
    .await
    .unwrap();

  let rows = s.select(Table::Decompositions, Select::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["components"], json!(["氵", "青"]));
  assert_eq!(rows[0]["confidence"], json!(90));
}

#[tokio::test]
async fn reading_flags_read_back_as_booleans() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('不', "no")], &["char"])
    .await
    .unwrap();
  let id = id_of(&s, '不').await;

  let readings = vec![
    row(json!({ "character_id": id, "type": "kHangul", "value": "부", "is_primary": true })),
    row(json!({ "character_id": id, "type": "kHangul", "value": "불", "is_primary": false })),
  ];
  s.upsert(Table::Readings, readings.clone(), Table::Readings.natural_key())
    .await
    .unwrap();
  s.upsert(Table::Readings, readings, Table::Readings.natural_key())
    .await
    .unwrap();

  let rows = s
    .select(
      Table::Readings,
      Select::columns(&["value", "is_primary"]).filter(Filter::eq("character_id", id)),
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0]["is_primary"], json!(true));
  assert_eq!(rows[1]["is_primary"], json!(false));
}

#[tokio::test]
async fn in_filter_matches_any_value() {
  let s = store().await;
  s.upsert(
    Table::Characters,
    vec![character('一', "one"), character('二', "two"), character('三', "three")],
    &["char"],
  )
  .await
  .unwrap();

  let rows = s
    .select(
      Table::Characters,
      Select::columns(&["char"]).filter(Filter::In("char".into(), vec![json!("一"), json!("三")])),
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);

  let none = s
    .select(Table::Characters, Select::default().filter(Filter::In("char".into(), vec![])))
    .await
    .unwrap();
  assert!(none.is_empty());
}

// ─── Update / delete / atomic ────────────────────────────────────────────────

#[tokio::test]
async fn update_patches_matching_rows() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('一', "one")], &["char"])
    .await
    .unwrap();

  let affected = s
    .update(
      Table::Characters,
      Filter::eq("char", "一"),
      row(json!({ "unihan_def": "하나, 첫째" })),
    )
    .await
    .unwrap();
  assert_eq!(affected, 1);

  let rows = s.select(Table::Characters, Select::columns(&["unihan_def"])).await.unwrap();
  assert_eq!(rows[0]["unihan_def"], json!("하나, 첫째"));
}

fn sense(id: &str, character_id: i64, order: u32) -> Row {
  row(json!({
    "id": id,
    "character_id": character_id,
    "label": format!("sense {order}"),
    "sort_order": order,
  }))
}

fn edge(id: &str, character_id: i64, parent: &str, child: &str, relation: &str) -> Row {
  row(json!({
    "id": id,
    "character_id": character_id,
    "parent_sense_id": parent,
    "child_sense_id": child,
    "relation": relation,
  }))
}

#[tokio::test]
async fn atomic_replaces_a_meaning_tree() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('清', "clear")], &["char"])
    .await
    .unwrap();
  let id = id_of(&s, '清').await;

  let replace = |senses: Vec<Row>, edges: Vec<Row>| {
    vec![
      WriteOp::Delete { table: Table::MeaningEdges, filter: Filter::eq("character_id", id) },
      WriteOp::Delete { table: Table::MeaningSenses, filter: Filter::eq("character_id", id) },
      WriteOp::Insert { table: Table::MeaningSenses, rows: senses },
      WriteOp::Insert { table: Table::MeaningEdges, rows: edges },
    ]
  };

  s.atomic(replace(
    vec![sense("a1", id, 1), sense("a2", id, 2)],
    vec![edge("e1", id, "a1", "a2", "extension")],
  ))
  .await
  .unwrap();
  s.atomic(replace(
    vec![sense("b1", id, 1), sense("b2", id, 2), sense("b3", id, 3)],
    vec![edge("f1", id, "b1", "b2", "extension"), edge("f2", id, "b1", "b3", "metaphor")],
  ))
  .await
  .unwrap();

  let senses = s.select(Table::MeaningSenses, Select::columns(&["id"])).await.unwrap();
  let ids: Vec<&str> = senses.iter().map(|r| r["id"].as_str().unwrap()).collect();
  assert_eq!(ids, vec!["b1", "b2", "b3"]);
  let edges = s.select(Table::MeaningEdges, Select::default()).await.unwrap();
  assert_eq!(edges.len(), 2);
}

#[tokio::test]
async fn failed_atomic_unit_leaves_previous_state() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('清', "clear")], &["char"])
    .await
    .unwrap();
  let id = id_of(&s, '清').await;
  s.insert(Table::MeaningSenses, vec![sense("a1", id, 1)]).await.unwrap();

  let err = s
    .atomic(vec![
      WriteOp::Delete { table: Table::MeaningSenses, filter: Filter::eq("character_id", id) },
      WriteOp::Insert { table: Table::MeaningSenses, rows: vec![sense("b1", id, 1), sense("b2", id, 2)] },
      WriteOp::Insert {
        table: Table::MeaningEdges,
        rows:  vec![edge("e1", id, "b1", "b2", "synonym")],
      },
    ])
    .await;
  assert!(matches!(err, Err(Error::Database(_))));

  let senses = s.select(Table::MeaningSenses, Select::columns(&["id"])).await.unwrap();
  assert_eq!(senses.len(), 1);
  assert_eq!(senses[0]["id"], json!("a1"));
}

#[tokio::test]
async fn edges_cannot_self_loop() {
  let s = store().await;
  s.upsert(Table::Characters, vec![character('一', "one")], &["char"])
    .await
    .unwrap();
  let id = id_of(&s, '一').await;
  s.insert(Table::MeaningSenses, vec![sense("a1", id, 1)]).await.unwrap();

  let err = s
    .insert(Table::MeaningEdges, vec![edge("e1", id, "a1", "a1", "extension")])
    .await;
  assert!(err.is_err());
}

#[tokio::test]
async fn delete_removes_matching_rows() {
  let s = store().await;
  s.upsert(
    Table::Characters,
    vec![character('一', "one"), character('二', "two")],
    &["char"],
  )
  .await
  .unwrap();

  let removed = s.delete(Table::Characters, Filter::eq("char", "二")).await.unwrap();
  assert_eq!(removed, 1);
  let rows = s.select(Table::Characters, Select::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
}
