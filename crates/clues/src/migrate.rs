//! Store initialization and one-time legacy migration.
//!
//! Older builds of the game kept clues in a `clues` table with either a
//! single `content` column or the split `character` / `user_message` /
//! `clue_text` columns. The first start against a fresh destination copies
//! those rows into the canonical schema. An existing destination is never
//! migrated again.

use crate::store::ClueStore;
use crate::text::normalize_text;
use arena_core::{AppError, AppResult};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Legacy columns and the labels they are rendered with, in output order.
const LEGACY_FIELDS: [(&str, &str); 3] = [
    ("character", "Character"),
    ("user_message", "Message"),
    ("clue_text", "Clue"),
];

/// Minimum number of legacy fields needed to synthesize content.
const MIN_LEGACY_FIELDS: usize = 2;

const FIELD_SEPARATOR: &str = " | ";

/// What [`initialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The destination already existed and was opened as-is
    Existing,
    /// A new empty store was created
    Created,
    /// A new store was created and filled from the legacy store
    Migrated { rows: usize },
}

/// Open the clue store at `destination`, creating or migrating it first.
///
/// The destination's existence is the migration guard, so calling this
/// repeatedly never duplicates rows. A failed migration removes the
/// half-written destination before returning the error.
pub fn initialize(destination: &Path, legacy: Option<&Path>) -> AppResult<(ClueStore, InitOutcome)> {
    if destination.exists() {
        let store = ClueStore::open(destination)?;
        return Ok((store, InitOutcome::Existing));
    }

    let legacy = legacy.filter(|path| path.exists());
    let Some(legacy_path) = legacy else {
        let store = ClueStore::open(destination)?;
        tracing::info!("Created empty clue store at {:?}", destination);
        return Ok((store, InitOutcome::Created));
    };

    tracing::info!(
        "Migrating legacy clue store {:?} into {:?}",
        legacy_path,
        destination
    );

    let result = open_legacy(legacy_path).and_then(|source| {
        let mut store = ClueStore::open(destination)?;
        let rows = migrate_legacy(&source, &mut store)?;
        Ok((store, rows))
    });

    match result {
        Ok((store, rows)) => {
            tracing::info!("Migrated {} legacy clues", rows);
            Ok((store, InitOutcome::Migrated { rows }))
        }
        Err(e) => {
            if destination.exists() {
                if let Err(remove_err) = std::fs::remove_file(destination) {
                    tracing::warn!(
                        "Failed to remove partial store {:?}: {}",
                        destination,
                        remove_err
                    );
                }
            }
            Err(e)
        }
    }
}

fn open_legacy(path: &Path) -> AppResult<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
        AppError::Store(format!("Failed to open legacy store {:?}: {}", path, e))
    })
}

/// Copy every legacy row from `source` into `destination` in one transaction.
///
/// Returns the number of rows written. Rows whose normalized content is
/// blank are skipped.
pub fn migrate_legacy(source: &Connection, destination: &mut ClueStore) -> AppResult<usize> {
    let columns = legacy_columns(source)?;

    let tx = destination
        .conn
        .transaction()
        .map_err(|e| AppError::Store(format!("Failed to start migration: {}", e)))?;

    let rows = if columns.iter().any(|c| c == "content") {
        copy_content_rows(source, &tx)?
    } else {
        let present: Vec<(&str, &str)> = LEGACY_FIELDS
            .iter()
            .copied()
            .filter(|(name, _)| columns.iter().any(|c| c == name))
            .collect();

        if present.len() < MIN_LEGACY_FIELDS {
            tracing::warn!(
                "Legacy store has no usable clue columns (found: {:?}); nothing migrated",
                columns
            );
            0
        } else {
            synthesize_rows(source, &tx, &present)?
        }
    };

    tx.commit()
        .map_err(|e| AppError::Store(format!("Failed to commit migration: {}", e)))?;

    Ok(rows)
}

fn legacy_columns(source: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = source
        .prepare("PRAGMA table_info(clues)")
        .map_err(|e| AppError::Store(format!("Failed to inspect legacy schema: {}", e)))?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| AppError::Store(format!("Failed to inspect legacy schema: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Store(format!("Failed to read legacy schema: {}", e)))?;

    Ok(names)
}

fn copy_content_rows(source: &Connection, tx: &rusqlite::Transaction<'_>) -> AppResult<usize> {
    let mut select = source
        .prepare("SELECT id, content FROM clues ORDER BY id")
        .map_err(|e| AppError::Store(format!("Failed to read legacy clues: {}", e)))?;
    let mut insert = tx
        .prepare("INSERT INTO clues (id, content) VALUES (?1, ?2)")
        .map_err(|e| AppError::Store(format!("Failed to prepare migration insert: {}", e)))?;

    let mut rows = select
        .query([])
        .map_err(|e| AppError::Store(format!("Failed to read legacy clues: {}", e)))?;

    let mut copied = 0;
    while let Some(row) = rows
        .next()
        .map_err(|e| AppError::Store(format!("Failed to read legacy row: {}", e)))?
    {
        let id: i64 = row
            .get(0)
            .map_err(|e| AppError::Store(format!("Invalid legacy clue id: {}", e)))?;
        let raw = row
            .get_ref(1)
            .map_err(|e| AppError::Store(format!("Failed to read legacy row: {}", e)))
            .map(value_as_text)?;

        let content = normalize_text(raw.as_deref().unwrap_or_default());
        if content.is_empty() {
            tracing::debug!("Skipping blank legacy clue #{}", id);
            continue;
        }

        insert
            .execute(params![id, content])
            .map_err(|e| AppError::Store(format!("Failed to migrate clue #{}: {}", id, e)))?;
        copied += 1;
    }

    Ok(copied)
}

fn synthesize_rows(
    source: &Connection,
    tx: &rusqlite::Transaction<'_>,
    fields: &[(&str, &str)],
) -> AppResult<usize> {
    let column_list = fields
        .iter()
        .map(|(name, _)| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {} FROM clues ORDER BY rowid", column_list);

    let mut select = source
        .prepare(&sql)
        .map_err(|e| AppError::Store(format!("Failed to read legacy clues: {}", e)))?;
    let mut insert = tx
        .prepare("INSERT INTO clues (content) VALUES (?1)")
        .map_err(|e| AppError::Store(format!("Failed to prepare migration insert: {}", e)))?;

    let mut rows = select
        .query([])
        .map_err(|e| AppError::Store(format!("Failed to read legacy clues: {}", e)))?;

    let mut written = 0;
    while let Some(row) = rows
        .next()
        .map_err(|e| AppError::Store(format!("Failed to read legacy row: {}", e)))?
    {
        let mut parts = Vec::with_capacity(fields.len());
        for (index, (_, label)) in fields.iter().enumerate() {
            let value = row
                .get_ref(index)
                .map_err(|e| AppError::Store(format!("Failed to read legacy row: {}", e)))
                .map(value_as_text)?;

            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                parts.push(format!("{}: {}", label, value));
            }
        }

        let content = normalize_text(&parts.join(FIELD_SEPARATOR));
        if content.is_empty() {
            continue;
        }

        insert
            .execute(params![content])
            .map_err(|e| AppError::Store(format!("Failed to migrate legacy row: {}", e)))?;
        written += 1;
    }

    Ok(written)
}

/// Render any SQLite value as text; `NULL` becomes `None`.
fn value_as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn legacy_db(path: &Path, schema: &str, rows: &[&str]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(schema).unwrap();
        for row in rows {
            conn.execute_batch(row).unwrap();
        }
    }

    #[test]
    fn test_initialize_creates_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");

        let (store, outcome) = initialize(&dest, None).unwrap();
        assert_eq!(outcome, InitOutcome::Created);
        assert_eq!(store.count().unwrap(), 0);
        assert!(dest.exists());
    }

    #[test]
    fn test_initialize_ignores_missing_legacy() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("absent.db");

        let (_, outcome) = initialize(&dest, Some(&legacy)).unwrap();
        assert_eq!(outcome, InitOutcome::Created);
    }

    #[test]
    fn test_migrates_content_column_preserving_ids() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        legacy_db(
            &legacy,
            "CREATE TABLE clues (id INTEGER PRIMARY KEY, content TEXT);",
            &[
                "INSERT INTO clues VALUES (7, '  The  professor hid a key. ');",
                "INSERT INTO clues VALUES (9, '   ');",
                "INSERT INTO clues VALUES (12, 'No one saw the thief.');",
            ],
        );

        let (store, outcome) = initialize(&dest, Some(&legacy)).unwrap();
        assert_eq!(outcome, InitOutcome::Migrated { rows: 2 });

        let all = store.list(10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 7);
        assert_eq!(all[0].content, "The professor hid a key.");
        assert_eq!(all[1].id, 12);
    }

    #[test]
    fn test_synthesizes_content_from_legacy_fields() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        legacy_db(
            &legacy,
            "CREATE TABLE clues (character TEXT, user_message TEXT, clue_text TEXT);",
            &[
                "INSERT INTO clues VALUES ('Janitor', 'Seen anything?', 'Mud  on the stairs');",
                "INSERT INTO clues VALUES ('Dean', NULL, 'The vault was open');",
                "INSERT INTO clues VALUES (NULL, '', NULL);",
            ],
        );

        let (store, outcome) = initialize(&dest, Some(&legacy)).unwrap();
        assert_eq!(outcome, InitOutcome::Migrated { rows: 2 });

        let all = store.list(10).unwrap();
        assert_eq!(
            all[0].content,
            "Character: Janitor | Message: Seen anything? | Clue: Mud on the stairs"
        );
        assert_eq!(all[1].content, "Character: Dean | Clue: The vault was open");
    }

    #[test]
    fn test_synthesizes_with_two_of_three_fields() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        legacy_db(
            &legacy,
            "CREATE TABLE clues (clue_text TEXT, character TEXT);",
            &["INSERT INTO clues VALUES ('Broken lamp', 'Librarian');"],
        );

        let (store, _) = initialize(&dest, Some(&legacy)).unwrap();
        let all = store.list(10).unwrap();
        // Output order follows the label order, not the legacy column order
        assert_eq!(all[0].content, "Character: Librarian | Clue: Broken lamp");
    }

    #[test]
    fn test_unusable_legacy_schema_migrates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        legacy_db(
            &legacy,
            "CREATE TABLE clues (clue_text TEXT);",
            &["INSERT INTO clues VALUES ('Lonely column');"],
        );

        let (store, outcome) = initialize(&dest, Some(&legacy)).unwrap();
        assert_eq!(outcome, InitOutcome::Migrated { rows: 0 });
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_initialize_twice_does_not_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        legacy_db(
            &legacy,
            "CREATE TABLE clues (id INTEGER PRIMARY KEY, content TEXT);",
            &["INSERT INTO clues VALUES (1, 'Only clue');"],
        );

        let (_, first) = initialize(&dest, Some(&legacy)).unwrap();
        let (store, second) = initialize(&dest, Some(&legacy)).unwrap();

        assert_eq!(first, InitOutcome::Migrated { rows: 1 });
        assert_eq!(second, InitOutcome::Existing);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_migration_removes_destination() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("story.db");
        let legacy = temp_dir.path().join("legacy.db");
        std::fs::write(&legacy, b"this is not a sqlite database at all").unwrap();

        let result = initialize(&dest, Some(&legacy));
        assert!(matches!(result, Err(AppError::Store(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_migrate_legacy_with_injected_handles() {
        let source = Connection::open_in_memory().unwrap();
        source
            .execute_batch(
                "CREATE TABLE clues (id INTEGER PRIMARY KEY, content TEXT);
                 INSERT INTO clues VALUES (3, 'Ink on the ledger');",
            )
            .unwrap();
        let mut dest = ClueStore::open_in_memory().unwrap();

        let rows = migrate_legacy(&source, &mut dest).unwrap();
        assert_eq!(rows, 1);
        assert_eq!(dest.list(5).unwrap()[0].id, 3);
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(ValueRef::Null), None);
        assert_eq!(value_as_text(ValueRef::Integer(42)), Some("42".to_string()));
        assert_eq!(value_as_text(ValueRef::Text(b"hi")), Some("hi".to_string()));
    }
}
