//! Read-only access to a docset's embedded libSQL/SQLite index store.
//!
//! Index stores come in two generations (see [`SchemaVariant`]) and carry no
//! version marker. [`DocsetStore::extract`] probes the modern layout first and
//! falls back to the legacy layout only when the modern table or one of its
//! columns does not exist. Every other failure is reported as
//! [`DocmuxError::Storage`].

mod queries;

use std::path::{Path, PathBuf};

use docmux_shared::{DocmuxError, RawEntry, Result, SchemaVariant};
use libsql::{Connection, Database, OpenFlags, Value, params};
use tracing::debug;

/// Rows extracted from one index store, in the store's native order.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Which generation the store turned out to use.
    pub variant: SchemaVariant,
    /// Every `(name, kind, raw_path)` row, materialized.
    pub rows: Vec<RawEntry>,
}

/// Read-only handle on one docset index store.
pub struct DocsetStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    path: PathBuf,
}

impl DocsetStore {
    /// Open the store at `path` read-only. The file must already exist.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
            .build()
            .await
            .map_err(|e| storage_error(path, &e))?;

        let conn = db.connect().map_err(|e| storage_error(path, &e))?;

        Ok(Self {
            db,
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Detect the schema generation and read every row.
    pub async fn extract(&self) -> Result<Extraction> {
        match self.read_rows(SchemaVariant::Modern).await {
            Ok(rows) => Ok(Extraction {
                variant: SchemaVariant::Modern,
                rows,
            }),
            Err(e) if is_missing_relation(&e) => {
                debug!(path = %self.path.display(), error = %e, "modern layout absent, trying legacy");
                let rows = self
                    .read_rows(SchemaVariant::Legacy)
                    .await
                    .map_err(|e| storage_error(&self.path, &e))?;
                Ok(Extraction {
                    variant: SchemaVariant::Legacy,
                    rows,
                })
            }
            Err(e) => Err(storage_error(&self.path, &e)),
        }
    }

    /// Run the query for `variant` and drain it eagerly.
    async fn read_rows(&self, variant: SchemaVariant) -> libsql::Result<Vec<RawEntry>> {
        let mut rows = self
            .conn
            .query(queries::query_for(variant), params![])
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(RawEntry {
                name: column_text(&row, 0)?,
                kind: column_text(&row, 1)?,
                raw_path: column_text(&row, 2)?,
            });
        }
        Ok(results)
    }
}

/// Whether a query failed only because a table or column does not exist.
fn is_missing_relation(err: &libsql::Error) -> bool {
    let message = match err {
        libsql::Error::SqliteFailure(_, message) => message.clone(),
        other => other.to_string(),
    };
    message.contains("no such table") || message.contains("no such column")
}

/// Read a column as text. The queries hand every column over as a blob and
/// invalid UTF-8 is replaced rather than rejected. NULL becomes empty.
fn column_text(row: &libsql::Row, idx: i32) -> libsql::Result<String> {
    Ok(match row.get_value(idx)? {
        Value::Text(text) => text,
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Real(n) => n.to_string(),
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn storage_error(path: &Path, err: &libsql::Error) -> DocmuxError {
    DocmuxError::Storage(format!("{}: {err}", path.display()))
}
