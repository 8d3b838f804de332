use seal_store::{
    BlobStore, MigrationReport, SqliteBlobStore, SqliteStampRegistry, StampRecord, StampRegistry,
    StoreConfig,
};
use seal_types::{BlobId, DesignGrid, SealMetadata, StampId};
use tracing::{debug, info, warn};

use crate::container::{Container, OpenedContents};
use crate::error::{SdkError, SdkResult};

/// Per-world handle to the blob store and stamp registry.
///
/// Created when a world loads and dropped when it unloads; every flow that
/// touches stored contents or stamps goes through it. Flows that fail leave
/// the container they were given untouched.
pub struct SealSession<B: BlobStore, S: StampRegistry> {
    blobs: B,
    stamps: S,
    migration: Option<MigrationReport>,
}

impl SealSession<SqliteBlobStore, SqliteStampRegistry> {
    /// Open the SQLite stores described by `config`.
    ///
    /// Legacy flat-file blobs are migrated before the session is returned,
    /// so no read can miss a blob that only exists on the old layout. Files
    /// or directories that could not be migrated end up in
    /// [`SealSession::migration_report`] and do not fail the open.
    pub fn open(config: &StoreConfig) -> SdkResult<Self> {
        config.validate()?;
        let blobs = SqliteBlobStore::open(config.blob_db_path())?;
        let stamps = SqliteStampRegistry::open(config.stamp_db_path())?;

        let migration = match config.legacy_dir_path() {
            Some(dir) => {
                let report = blobs.migrate_legacy(&dir)?;
                if !report.is_clean() {
                    warn!(
                        undeleted = report.undeleted.len(),
                        failed = report.failed.len(),
                        "legacy migration left files behind"
                    );
                }
                Some(report)
            }
            None => None,
        };

        info!(
            save = %config.save_id,
            dir = %config.mod_data_dir().display(),
            "seal session opened"
        );
        Ok(Self {
            blobs,
            stamps,
            migration,
        })
    }
}

impl<B: BlobStore, S: StampRegistry> SealSession<B, S> {
    /// Wrap already-open stores. No migration runs.
    pub fn with_stores(blobs: B, stamps: S) -> Self {
        Self {
            blobs,
            stamps,
            migration: None,
        }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn stamps(&self) -> &S {
        &self.stamps
    }

    /// Outcome of the legacy migration run by [`SealSession::open`].
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration.as_ref()
    }

    // ---- Stamp designs ----

    /// Register a finished design and return its id.
    pub fn save_stamp_design(
        &self,
        title: &str,
        creator_id: &str,
        grid: &DesignGrid,
    ) -> SdkResult<StampId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SdkError::InvalidArgument("stamp title must not be empty".into()));
        }
        let dimensions = u32::try_from(grid.dimensions()).map_err(|_| {
            SdkError::InvalidArgument(format!("grid side {} too large", grid.dimensions()))
        })?;
        let id = self.stamps.insert(title, creator_id, &grid.pack(), dimensions)?;
        info!(%id, title, creator_id, dimensions, "stamp design saved");
        Ok(id)
    }

    pub fn stamp(&self, id: StampId) -> SdkResult<StampRecord> {
        self.stamps
            .get(id)?
            .ok_or_else(|| SdkError::NotFound(format!("stamp {id}")))
    }

    /// Metadata for a stamp tool engraved with a registered design.
    pub fn engrave_stamp(&self, id: StampId) -> SdkResult<SealMetadata> {
        let record = self.stamp(id)?;
        let mut meta = SealMetadata::new();
        meta.stamp_id = Some(id);
        meta.stamp_title = Some(record.title.clone());
        meta.stamp_design = Some(record.design_string()?);
        Ok(meta)
    }

    // ---- Container flows ----

    /// Put a payload into an empty or opened container.
    pub fn fill_container(
        &self,
        container: &mut Container,
        creator_id: &str,
        payload: &[u8],
    ) -> SdkResult<BlobId> {
        let next = container.state.after_fill().ok_or_else(|| {
            SdkError::InvalidState(format!("cannot fill a {} container", container.state))
        })?;
        let id = self.blobs.insert(creator_id, payload)?;
        container.meta.contents_id = Some(id.clone());
        container.state = next;
        debug!(id = %id.short_id(), bytes = payload.len(), "container filled");
        Ok(id)
    }

    /// Seal a filled container with a registered stamp and a wax color.
    ///
    /// The stamp's title and design are copied onto the container so it
    /// renders without a registry lookup.
    pub fn seal_container(
        &self,
        container: &mut Container,
        stamp_id: StampId,
        wax_color: &str,
        sealer_name: &str,
    ) -> SdkResult<()> {
        let next = container.state.after_seal().ok_or_else(|| {
            SdkError::InvalidState(format!("cannot seal a {} container", container.state))
        })?;
        if container.meta.contents_id.is_none() {
            return Err(SdkError::InvalidState("container has no contents".into()));
        }
        let wax_color = wax_color.trim();
        if wax_color.is_empty() {
            return Err(SdkError::InvalidArgument("wax color must not be empty".into()));
        }
        let record = self.stamp(stamp_id)?;
        let design = record.design_string()?;

        let meta = &mut container.meta;
        meta.stamp_id = Some(stamp_id);
        meta.stamp_title = Some(record.title);
        meta.stamp_design = Some(design);
        meta.wax_color = Some(wax_color.to_string());
        meta.sealer_name = Some(sealer_name.to_string()).filter(|n| !n.is_empty());
        container.state = next;
        info!(%stamp_id, wax_color, "container sealed");
        Ok(())
    }

    /// Take the contents out of a container.
    ///
    /// Reading never consumes the stored record; the returned container no
    /// longer references it.
    pub fn open_container(&self, container: &Container) -> SdkResult<OpenedContents> {
        let next = container.state.after_open().ok_or_else(|| {
            SdkError::InvalidState(format!("cannot open a {} container", container.state))
        })?;
        let id = container
            .meta
            .contents_id
            .as_ref()
            .ok_or_else(|| SdkError::InvalidState("container has no contents".into()))?;
        let record = self
            .blobs
            .get(id)?
            .ok_or_else(|| SdkError::NotFound(format!("contents {id}")))?;

        debug!(id = %id.short_id(), from = %container.state, to = %next, "container opened");
        Ok(OpenedContents {
            payload: record.payload,
            creator_id: record.creator_id,
            container: Container {
                kind: container.kind,
                state: next,
                meta: container.meta.carried_over(),
            },
        })
    }

    /// Set sender and recipient lines. Blank lines clear the field.
    pub fn set_addresses(&self, container: &mut Container, from: &str, to: &str) -> SdkResult<()> {
        if container.is_sealed() {
            return Err(SdkError::InvalidState(
                "a sealed container cannot be readdressed".into(),
            ));
        }
        let line = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        container.meta.from = line(from);
        container.meta.to = line(to);
        Ok(())
    }

    /// Replace a legacy sealer uid with the player's name.
    ///
    /// Returns whether the metadata changed.
    pub fn remap_legacy_sealer<F>(&self, meta: &mut SealMetadata, resolve_name: F) -> bool
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if !meta.needs_migration() {
            return false;
        }
        let changed = meta.migrate_legacy(resolve_name);
        if meta.sealer_id.is_some() {
            warn!(uid = ?meta.sealer_id, "legacy sealer uid could not be resolved");
        }
        changed
    }
}
