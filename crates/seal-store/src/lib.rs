//! Durable storage for sealed containers.
//!
//! Two stores back the sealing workflow:
//!
//! - a [`BlobStore`] holding the opaque contents of each sealed container,
//!   keyed by a generated [`BlobId`](seal_types::BlobId) that the container
//!   item carries in its attributes;
//! - a [`StampRegistry`] holding player-designed stamps, keyed by an
//!   increasing [`StampId`](seal_types::StampId).
//!
//! # Storage Backends
//!
//! - [`SqliteBlobStore`] / [`SqliteStampRegistry`] -- one SQLite file each,
//!   a fresh connection per call
//! - [`InMemoryBlobStore`] / [`InMemoryStampRegistry`] -- for tests and embedding
//!
//! # Legacy Layout
//!
//! Old saves kept one extensionless file per blob. [`migrate_legacy_dir`]
//! (also available as [`BlobStore::migrate_legacy`]) moves those files into
//! a blob store, keeping their ids.
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; reading never consumes.
//! 2. An unknown id is `Ok(None)`, not an error.
//! 3. No connection or cursor state survives a call.
//! 4. All I/O and database errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod memory;
pub mod migrate;
pub mod record;
pub mod sqlite;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBlobStore, InMemoryStampRegistry};
pub use migrate::{migrate_legacy_dir, MigrationFailure, MigrationReport};
pub use record::{BlobRecord, StampRecord, LEGACY_CREATOR};
pub use sqlite::{SqliteBlobStore, SqliteStampRegistry};
pub use traits::{BlobStore, StampRegistry};
