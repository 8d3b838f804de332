//! Session API for sealed containers.
//!
//! A [`SealSession`] is opened when a world loads and owns that world's blob
//! store and stamp registry. The item layer calls it to save stamp designs,
//! fill, seal and open containers, and to bring legacy item metadata up to
//! date.

pub mod container;
pub mod error;
pub mod session;

pub use container::{Container, OpenedContents};
pub use error::{SdkError, SdkResult};
pub use session::SealSession;

// Re-export key types
pub use seal_store::{MigrationReport, StampRecord, StoreConfig};
pub use seal_types::{BlobId, ContainerKind, ContainerState, DesignGrid, SealMetadata, StampId};
