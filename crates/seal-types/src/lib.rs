//! Foundation types for sealed containers and stamp emblems.
//!
//! Every other `seal-*` crate depends on `seal-types`.
//!
//! # Key Types
//!
//! - [`BlobId`] -- identifier of a container's sealed contents
//! - [`StampId`] -- identifier of a registered stamp design
//! - [`DesignGrid`] -- square boolean design plus its packed bit codec
//! - [`SealMetadata`] -- typed per-item metadata with legacy migration
//! - [`ContainerKind`] / [`ContainerState`] -- container lifecycle

pub mod error;
pub mod grid;
pub mod ids;
pub mod metadata;

pub use error::TypeError;
pub use grid::{
    design_string, pack_bits, packed_len, packed_len_for, parse_design_string, unpack_bits,
    DesignGrid,
};
pub use ids::{BlobId, StampId};
pub use metadata::{keys, ContainerKind, ContainerState, SealMetadata};
