use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::identity::VisualIdentity;

/// An engine-side resource that must be given back explicitly.
pub trait ReleaseResource {
    fn release(self);
}

/// Generated geometry keyed by [`VisualIdentity`].
///
/// Entries are created lazily, at most once per key, and hold their
/// resource until invalidated. Dropping the cache releases everything it
/// still holds. All methods take `&mut self`; the cache is meant to live on
/// the render thread that owns the resources.
pub struct GeometryCache<R: ReleaseResource> {
    entries: HashMap<VisualIdentity, R>,
    generations: u64,
}

impl<R: ReleaseResource> GeometryCache<R> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generations: 0,
        }
    }

    /// The entry for `identity`, generating it on a miss.
    ///
    /// `generate` runs at most once per call and only when no entry exists.
    /// If it fails, nothing is stored and the error is returned.
    pub fn get_or_create<E, F>(&mut self, identity: &VisualIdentity, generate: F) -> Result<&R, E>
    where
        F: FnOnce() -> Result<R, E>,
    {
        match self.entries.entry(identity.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let resource = generate()?;
                self.generations += 1;
                debug!(key = %entry.key(), "geometry generated");
                Ok(entry.insert(resource))
            }
        }
    }

    pub fn get(&self, identity: &VisualIdentity) -> Option<&R> {
        self.entries.get(identity)
    }

    pub fn contains(&self, identity: &VisualIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Release and drop the entry for `identity`. Returns whether one existed.
    pub fn invalidate(&mut self, identity: &VisualIdentity) -> bool {
        match self.entries.remove(identity) {
            Some(resource) => {
                resource.release();
                debug!(key = %identity, "geometry invalidated");
                true
            }
            None => false,
        }
    }

    /// Release every entry. Returns how many were released.
    pub fn clear_all(&mut self) -> usize {
        let count = self.entries.len();
        for (_, resource) in self.entries.drain() {
            resource.release();
        }
        if count > 0 {
            debug!(count, "geometry cache cleared");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful generations since the cache was created.
    pub fn generations(&self) -> u64 {
        self.generations
    }
}

impl<R: ReleaseResource> Default for GeometryCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReleaseResource> Drop for GeometryCache<R> {
    fn drop(&mut self) {
        self.clear_all();
    }
}

impl<R: ReleaseResource> std::fmt::Debug for GeometryCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryCache")
            .field("entries", &self.entries.len())
            .field("generations", &self.generations)
            .finish()
    }
}
