//! SQLite-backed stores.
//!
//! Each store owns one database file. Every trait call opens its own
//! connection, performs a single statement and drops the connection, so no
//! cursor or transaction outlives the call that started it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use seal_types::{BlobId, StampId};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::{BlobRecord, StampRecord};
use crate::traits::{BlobStore, StampRegistry};

const BLOBS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS blobs (id TEXT PRIMARY KEY, creator_id TEXT, payload BLOB);";

const STAMPS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS stamps (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     creator_id TEXT, \
     title TEXT DEFAULT '', \
     design BLOB, \
     dimensions INTEGER);";

/// How long a call waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn connect(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Create the parent directory and the table if either is missing.
fn prepare_database(path: &Path, schema: &str) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = connect(path)?;
    conn.execute_batch(schema)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

/// Blob store persisted in a single SQLite file (`blobs` table).
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
    path: PathBuf,
}

impl SqliteBlobStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        prepare_database(&path, BLOBS_SCHEMA)?;
        info!(path = %path.display(), "blob store opened");
        Ok(Self { path })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for SqliteBlobStore {
    fn insert(&self, creator_id: &str, payload: &[u8]) -> StoreResult<BlobId> {
        let conn = connect(&self.path)?;
        let id = BlobId::generate();
        conn.execute(
            "INSERT INTO blobs (id, creator_id, payload) VALUES (?1, ?2, ?3)",
            params![id.as_str(), creator_id, payload],
        )?;
        debug!(id = %id.short_id(), creator_id, bytes = payload.len(), "blob inserted");
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Option<BlobRecord>> {
        let conn = connect(&self.path)?;
        let row = conn
            .query_row(
                "SELECT creator_id, payload FROM blobs WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<Vec<u8>>>(1)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(creator_id, payload)| BlobRecord {
            id: id.clone(),
            creator_id: creator_id.unwrap_or_default(),
            payload: payload.unwrap_or_default(),
        }))
    }

    fn import(&self, id: &BlobId, creator_id: &str, payload: &[u8]) -> StoreResult<bool> {
        let conn = connect(&self.path)?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO blobs (id, creator_id, payload) VALUES (?1, ?2, ?3)",
            params![id.as_str(), creator_id, payload],
        )?;
        if changed > 0 {
            debug!(id = %id.short_id(), creator_id, bytes = payload.len(), "blob imported");
        }
        Ok(changed > 0)
    }

    fn len(&self) -> StoreResult<u64> {
        let conn = connect(&self.path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn contains(&self, id: &BlobId) -> StoreResult<bool> {
        let conn = connect(&self.path)?;
        let found = conn
            .query_row(
                "SELECT 1 FROM blobs WHERE id = ?1",
                params![id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

// ---------------------------------------------------------------------------
// Stamps
// ---------------------------------------------------------------------------

/// Stamp registry persisted in a single SQLite file (`stamps` table).
#[derive(Debug, Clone)]
pub struct SqliteStampRegistry {
    path: PathBuf,
}

impl SqliteStampRegistry {
    /// Open (or create) the registry at `path`.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        prepare_database(&path, STAMPS_SCHEMA)?;
        info!(path = %path.display(), "stamp registry opened");
        Ok(Self { path })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StampRegistry for SqliteStampRegistry {
    fn insert(
        &self,
        title: &str,
        creator_id: &str,
        design: &[u8],
        dimensions: u32,
    ) -> StoreResult<StampId> {
        let conn = connect(&self.path)?;
        conn.execute(
            "INSERT INTO stamps (title, creator_id, design, dimensions) VALUES (?1, ?2, ?3, ?4)",
            params![title, creator_id, design, dimensions],
        )?;
        let id = StampId::new(conn.last_insert_rowid());
        debug!(%id, title, creator_id, dimensions, "stamp registered");
        Ok(id)
    }

    fn get(&self, id: StampId) -> StoreResult<Option<StampRecord>> {
        let conn = connect(&self.path)?;
        let row = conn
            .query_row(
                "SELECT creator_id, title, design, dimensions FROM stamps WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<Vec<u8>>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((creator_id, title, design, dimensions)) = row else {
            return Ok(None);
        };
        let dimensions = dimensions
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(|| StoreError::CorruptRecord {
                id: id.to_string(),
                reason: format!("invalid dimensions {dimensions:?}"),
            })?;

        Ok(Some(StampRecord {
            id,
            title: title.unwrap_or_default(),
            creator_id: creator_id.unwrap_or_default(),
            design: design.unwrap_or_default(),
            dimensions,
        }))
    }

    fn len(&self) -> StoreResult<u64> {
        let conn = connect(&self.path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stamps", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
