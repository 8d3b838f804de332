//! Hashing primitives for sealed containers.
//!
//! Provides domain-separated BLAKE3 hashing and the short design
//! fingerprints used to key rendered geometry.
//!
//! All hashing goes through the `blake3` crate; nothing here is custom cryptography.

pub mod fingerprint;
pub mod hasher;

pub use fingerprint::DesignFingerprint;
pub use hasher::ContentHasher;
