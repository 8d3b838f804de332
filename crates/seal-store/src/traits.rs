use std::path::Path;

use seal_types::{BlobId, StampId};

use crate::error::StoreResult;
use crate::migrate::{migrate_legacy_dir, MigrationReport};
use crate::record::{BlobRecord, StampRecord};

/// Durable storage for the sealed contents of containers.
///
/// All implementations must satisfy these invariants:
/// - The store generates identifiers; a successful insert never returns an
///   empty id and never reuses one.
/// - Records are immutable once written. Opening a container reads its
///   record but never removes it.
/// - An unknown id is a normal outcome (`Ok(None)`), not an error.
/// - Every call is self-contained: no connection or cursor state survives
///   between calls, so interleaved callers never observe partial writes.
/// - Storage errors are propagated, never silently ignored.
pub trait BlobStore: Send + Sync {
    /// Store a payload under a freshly generated id and return that id.
    fn insert(&self, creator_id: &str, payload: &[u8]) -> StoreResult<BlobId>;

    /// Point lookup by id.
    fn get(&self, id: &BlobId) -> StoreResult<Option<BlobRecord>>;

    /// Store a payload under an id chosen by the caller.
    ///
    /// Returns `false` without writing anything if the id is already taken.
    /// Only used to ingest blobs that already have an id out in the world.
    fn import(&self, id: &BlobId, creator_id: &str, payload: &[u8]) -> StoreResult<bool>;

    /// Number of stored blobs.
    fn len(&self) -> StoreResult<u64>;

    /// Check whether a blob exists.
    fn contains(&self, id: &BlobId) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Ingest a directory in the legacy one-file-per-blob layout.
    ///
    /// See [`migrate_legacy_dir`] for the per-file rules.
    fn migrate_legacy(&self, directory: &Path) -> StoreResult<MigrationReport> {
        migrate_legacy_dir(self, directory)
    }
}

/// Durable storage for player-designed stamps.
///
/// Records are immutable and ids increase monotonically without reuse. The
/// registry stores designs as given; checking that a design matches its
/// dimensions happens at the codec boundary, before insert.
pub trait StampRegistry: Send + Sync {
    /// Register a new design and return its id.
    fn insert(
        &self,
        title: &str,
        creator_id: &str,
        design: &[u8],
        dimensions: u32,
    ) -> StoreResult<StampId>;

    /// Point lookup by id.
    fn get(&self, id: StampId) -> StoreResult<Option<StampRecord>>;

    /// Number of registered stamps.
    fn len(&self) -> StoreResult<u64>;

    /// Returns `true` if no stamp is registered.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
