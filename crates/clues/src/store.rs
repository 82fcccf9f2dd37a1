//! SQLite-backed clue store.

use crate::text::normalize_text;
use crate::types::ClueRecord;
use arena_core::{AppError, AppResult};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

pub(crate) const CREATE_CLUES_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS clues (id INTEGER PRIMARY KEY AUTOINCREMENT, content TEXT)";

/// Owner of all clue records.
pub struct ClueStore {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl ClueStore {
    /// Open (or create) the store at `path`, ensuring the schema exists.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Store(format!("Failed to open clue store {:?}: {}", path, e)))?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.ensure_schema()?;

        tracing::debug!("Opened clue store at {:?}", path);
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory store: {}", e)))?;

        let store = Self { conn, path: None };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Location on disk, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the `clues` table if it does not exist.
    pub fn ensure_schema(&self) -> AppResult<()> {
        self.conn
            .execute_batch(CREATE_CLUES_TABLE)
            .map_err(|e| AppError::Store(format!("Failed to create clues table: {}", e)))
    }

    /// Insert a clue and return its id.
    ///
    /// Content is normalized first; blank text is rejected.
    pub fn insert(&self, content: &str) -> AppResult<i64> {
        let content = normalize_text(content);
        if content.is_empty() {
            return Err(AppError::Store("Clue content cannot be empty".to_string()));
        }

        self.conn
            .execute("INSERT INTO clues (content) VALUES (?1)", params![content])
            .map_err(|e| AppError::Store(format!("Failed to insert clue: {}", e)))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Inserted clue #{}", id);
        Ok(id)
    }

    /// Clues whose content contains any of `terms`, case-insensitively.
    ///
    /// SQLite `LIKE` folds ASCII case only, which covers every term
    /// produced by [`crate::tokenize`].
    pub fn scan_matching<S: AsRef<str>>(
        &self,
        terms: &[S],
        limit: usize,
    ) -> AppResult<Vec<ClueRecord>> {
        let mut patterns: Vec<String> = Vec::with_capacity(terms.len());
        for term in terms {
            let pattern = format!("%{}%", escape_like(term.as_ref()));
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }

        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        // Bound as one JSON array; an OR chain per term hits SQLite's
        // expression depth limit on long questions
        let patterns_json = serde_json::to_string(&patterns)?;
        let sql = format!(
            "SELECT id, content FROM clues \
             WHERE EXISTS (SELECT 1 FROM json_each(?1) WHERE clues.content LIKE json_each.value ESCAPE '\\') \
             ORDER BY id LIMIT {}",
            sql_limit(limit)
        );

        let records = self.query_records(&sql, params![patterns_json])?;

        tracing::debug!(
            "Filtered scan over {} terms returned {} clues (limit {})",
            patterns.len(),
            records.len(),
            limit
        );
        Ok(records)
    }

    /// Up to `limit` clues with no filter.
    pub fn sample_any(&self, limit: usize) -> AppResult<Vec<ClueRecord>> {
        let sql = format!(
            "SELECT id, content FROM clues ORDER BY id LIMIT {}",
            sql_limit(limit)
        );
        self.query_records(&sql, [])
    }

    /// List clues in id order.
    pub fn list(&self, limit: usize) -> AppResult<Vec<ClueRecord>> {
        self.sample_any(limit)
    }

    /// Number of stored clues.
    pub fn count(&self) -> AppResult<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM clues", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u64)
            })
            .map_err(|e| AppError::Store(format!("Failed to count clues: {}", e)))
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> AppResult<Vec<ClueRecord>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params, record_from_row)
            .map_err(|e| AppError::Store(format!("Failed to query clues: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("Failed to read clue row: {}", e)))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ClueRecord> {
    Ok(ClueRecord {
        id: row.get(0)?,
        // Rows written by older tools may carry NULL content
        content: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    })
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
