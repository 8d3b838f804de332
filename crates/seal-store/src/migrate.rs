//! Ingestion of the legacy one-file-per-blob layout.
//!
//! Before the database existed every sealed payload was written to its own
//! extensionless file, named by the blob id that the container item still
//! carries. Migration copies each such file into a [`BlobStore`] under that
//! same id and deletes the file once the copy is durable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use seal_types::{BlobId, TypeError};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::record::LEGACY_CREATOR;
use crate::traits::BlobStore;

/// A legacy file that could not be migrated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one migration pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Ids now present in the store whose source file was removed.
    pub migrated: Vec<BlobId>,
    /// Ids now present in the store whose source file could not be removed.
    /// A later pass deletes them without storing a second copy.
    pub undeleted: Vec<(BlobId, PathBuf)>,
    /// Files left untouched because they could not be stored.
    pub failed: Vec<MigrationFailure>,
    /// Entries ignored because they are directories or carry an extension.
    pub skipped: usize,
}

impl MigrationReport {
    /// `true` when every candidate file was stored and removed.
    pub fn is_clean(&self) -> bool {
        self.undeleted.is_empty() && self.failed.is_empty()
    }
}

/// Migrate every extensionless file in `directory` into `store`.
///
/// Each file is handled on its own: a file that cannot be read, named,
/// stored or deleted is logged and recorded in the report, and the pass
/// moves on. A missing directory yields an empty report, and one that
/// cannot be listed is recorded as a single failure for the directory.
/// Errors returned from here come from the store itself.
///
/// A file whose id is already stored with byte-identical contents counts as
/// migrated (an earlier pass stored it but failed to delete it). The same id
/// with different contents is a conflict and the file is kept.
pub fn migrate_legacy_dir<S>(store: &S, directory: &Path) -> StoreResult<MigrationReport>
where
    S: BlobStore + ?Sized,
{
    let mut report = MigrationReport::default();

    let listing = match fs::read_dir(directory) {
        Ok(listing) => listing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %directory.display(), "no legacy blob directory");
            return Ok(report);
        }
        Err(e) => {
            warn!(dir = %directory.display(), error = %e, "legacy blob directory not readable");
            report.failed.push(MigrationFailure {
                path: directory.to_path_buf(),
                reason: e.to_string(),
            });
            return Ok(report);
        }
    };

    let mut entries = Vec::new();
    for entry in listing {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(dir = %directory.display(), error = %e, "unreadable legacy directory entry");
                report.failed.push(MigrationFailure {
                    path: directory.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir || path.extension().is_some() {
            report.skipped += 1;
            continue;
        }

        let id = match stored_copy(store, &path) {
            Ok(id) => id,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "legacy blob not migrated");
                report.failed.push(MigrationFailure {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id = %id.short_id(), "legacy blob migrated");
                report.migrated.push(id);
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "legacy blob stored but source file not removed"
                );
                report.undeleted.push((id, path));
            }
        }
    }

    info!(
        dir = %directory.display(),
        migrated = report.migrated.len(),
        undeleted = report.undeleted.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "legacy blob migration finished"
    );
    Ok(report)
}

/// Make sure the contents of `path` are in the store under the file's name.
fn stored_copy<S>(store: &S, path: &Path) -> StoreResult<BlobId>
where
    S: BlobStore + ?Sized,
{
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TypeError::InvalidId(format!("non UTF-8 legacy file name {path:?}")))?;
    let id = BlobId::parse(name)?;
    let payload = fs::read(path)?;

    if store.import(&id, LEGACY_CREATOR, &payload)? {
        return Ok(id);
    }
    match store.get(&id)? {
        Some(existing) if existing.payload == payload => Ok(id),
        _ => Err(StoreError::Conflict(id)),
    }
}
