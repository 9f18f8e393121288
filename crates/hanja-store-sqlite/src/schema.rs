//! SQL schema for the hanja SQLite store.
//!
//! Every statement is written against the `{schema}` placeholder, which
//! [`schema_sql`] replaces with the attached database name. Executed at
//! connection startup; idempotent thanks to `IF NOT EXISTS`.

const SCHEMA_TEMPLATE: &str = "
CREATE TABLE IF NOT EXISTS {schema}.characters (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    char        TEXT    NOT NULL UNIQUE,
    codepoint   INTEGER NOT NULL,
    strokes     INTEGER,
    radical     TEXT,
    unihan_def  TEXT
);

-- One row per (character, reading system, value); re-runs converge.
CREATE TABLE IF NOT EXISTS {schema}.readings (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    character_id INTEGER NOT NULL REFERENCES characters(id),
    type         TEXT    NOT NULL,
    value        TEXT    NOT NULL,
    is_primary   INTEGER NOT NULL DEFAULT 0,
    UNIQUE (character_id, type, value)
);

CREATE TABLE IF NOT EXISTS {schema}.phonetic_classes (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT    NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS {schema}.character_phonetic_class (
    character_id      INTEGER NOT NULL REFERENCES characters(id),
    phonetic_class_id INTEGER NOT NULL REFERENCES phonetic_classes(id),
    PRIMARY KEY (character_id, phonetic_class_id)
);

-- At most one decomposition per character.
CREATE TABLE IF NOT EXISTS {schema}.decompositions (
    character_id INTEGER PRIMARY KEY REFERENCES characters(id),
    ids          TEXT,
    components   TEXT    NOT NULL,   -- JSON array of single-character strings
    confidence   INTEGER NOT NULL
);

-- Sense and edge ids are UUIDs chosen by the curation loader.
CREATE TABLE IF NOT EXISTS {schema}.meaning_senses (
    id           TEXT    PRIMARY KEY,
    character_id INTEGER NOT NULL REFERENCES characters(id),
    label        TEXT    NOT NULL,
    short_gloss  TEXT,
    example      TEXT,
    sort_order   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS {schema}.meaning_edges (
    id              TEXT    PRIMARY KEY,
    character_id    INTEGER NOT NULL REFERENCES characters(id),
    parent_sense_id TEXT    NOT NULL REFERENCES meaning_senses(id),
    child_sense_id  TEXT    NOT NULL REFERENCES meaning_senses(id),
    relation        TEXT    NOT NULL
                    CHECK (relation IN ('extension', 'metaphor', 'specialization')),
    note            TEXT,
    CHECK (parent_sense_id != child_sense_id),
    UNIQUE (child_sense_id)
);

CREATE INDEX IF NOT EXISTS {schema}.readings_character_idx ON readings(character_id);
CREATE INDEX IF NOT EXISTS {schema}.senses_character_idx   ON meaning_senses(character_id);
CREATE INDEX IF NOT EXISTS {schema}.edges_character_idx    ON meaning_edges(character_id);

PRAGMA {schema}.journal_mode = WAL;
PRAGMA {schema}.user_version = 1;
";

/// The full DDL for `schema`.
pub fn schema_sql(schema: &str) -> String { SCHEMA_TEMPLATE.replace("{schema}", schema) }

/// Whether `name` is safe to splice into SQL as a schema identifier.
pub fn is_valid_schema(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    && !name.eq_ignore_ascii_case("main")
    && !name.eq_ignore_ascii_case("temp")
}
