//! Rendering of stamp designs onto item geometry.
//!
//! - [`Shape`] -- the named-node template model the host loads from JSON
//! - [`ImpressionGenerator`] -- stamp-face blocks and wax-impression decals,
//!   masked to a round seal
//! - [`VisualIdentity`] -- the one place cache keys come from
//! - [`GeometryCache`] -- uploaded geometry per identity, released on
//!   invalidation and teardown
//! - [`SealRenderer`] -- the per-frame hook tying the above to a
//!   [`MeshUploader`]

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod impression;
pub mod renderer;
pub mod shape;

pub use cache::{GeometryCache, ReleaseResource};
pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use identity::VisualIdentity;
pub use impression::{in_mask, split_column, ImpressionGenerator, ImpressionStyle, Placement};
pub use renderer::{MeshUploader, SealRenderer};
pub use shape::{FaceSide, Shape, ShapeElement, ShapeFace};
