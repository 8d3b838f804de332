use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use seal_types::{BlobId, StampId};

use crate::error::StoreResult;
use crate::record::{BlobRecord, StampRecord};
use crate::traits::{BlobStore, StampRegistry};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Records live behind a `RwLock` and are
/// cloned on read/write.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, BlobRecord>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn insert(&self, creator_id: &str, payload: &[u8]) -> StoreResult<BlobId> {
        let mut map = self.blobs.write().expect("lock poisoned");
        let mut id = BlobId::generate();
        while map.contains_key(&id) {
            id = BlobId::generate();
        }
        map.insert(
            id.clone(),
            BlobRecord {
                id: id.clone(),
                creator_id: creator_id.to_string(),
                payload: payload.to_vec(),
            },
        );
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Option<BlobRecord>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn import(&self, id: &BlobId, creator_id: &str, payload: &[u8]) -> StoreResult<bool> {
        let mut map = self.blobs.write().expect("lock poisoned");
        if map.contains_key(id) {
            return Ok(false);
        }
        map.insert(
            id.clone(),
            BlobRecord {
                id: id.clone(),
                creator_id: creator_id.to_string(),
                payload: payload.to_vec(),
            },
        );
        Ok(true)
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.blobs.read().expect("lock poisoned").len() as u64)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.blobs.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &count)
            .finish()
    }
}

struct StampTable {
    next_id: i64,
    rows: BTreeMap<StampId, StampRecord>,
}

/// In-memory stamp registry with the same id discipline as the SQLite one:
/// ids start at 1 and are never reused.
pub struct InMemoryStampRegistry {
    table: RwLock<StampTable>,
}

impl InMemoryStampRegistry {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(StampTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryStampRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StampRegistry for InMemoryStampRegistry {
    fn insert(
        &self,
        title: &str,
        creator_id: &str,
        design: &[u8],
        dimensions: u32,
    ) -> StoreResult<StampId> {
        let mut table = self.table.write().expect("lock poisoned");
        let id = StampId::new(table.next_id);
        table.next_id += 1;
        table.rows.insert(
            id,
            StampRecord {
                id,
                title: title.to_string(),
                creator_id: creator_id.to_string(),
                design: design.to_vec(),
                dimensions,
            },
        );
        Ok(id)
    }

    fn get(&self, id: StampId) -> StoreResult<Option<StampRecord>> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.rows.get(&id).cloned())
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.table.read().expect("lock poisoned").rows.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryStampRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.read().expect("lock poisoned");
        f.debug_struct("InMemoryStampRegistry")
            .field("stamp_count", &table.rows.len())
            .field("next_id", &table.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Blobs
    // -----------------------------------------------------------------------

    #[test]
    fn insert_and_get_blob() {
        let store = InMemoryBlobStore::new();
        let id = store.insert("player-1", b"a letter").unwrap();
        let rec = store.get(&id).unwrap().expect("should exist");
        assert_eq!(rec.payload, b"a letter");
        assert_eq!(rec.creator_id, "player-1");
        assert_eq!(rec.id, id);
    }

    #[test]
    fn get_missing_blob_returns_none() {
        let store = InMemoryBlobStore::new();
        assert!(store.get(&BlobId::generate()).unwrap().is_none());
    }

    #[test]
    fn identical_payloads_get_distinct_ids() {
        let store = InMemoryBlobStore::new();
        let a = store.insert("p", b"same").unwrap();
        let b = store.insert("p", b"same").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn reading_does_not_consume() {
        let store = InMemoryBlobStore::new();
        let id = store.insert("p", b"kept").unwrap();
        store.get(&id).unwrap();
        assert!(store.contains(&id).unwrap());
    }

    #[test]
    fn import_refuses_taken_id() {
        let store = InMemoryBlobStore::new();
        let id = BlobId::parse("legacy-1").unwrap();
        assert!(store.import(&id, "legacy", b"first").unwrap());
        assert!(!store.import(&id, "legacy", b"second").unwrap());
        assert_eq!(store.get(&id).unwrap().unwrap().payload, b"first");
    }

    #[test]
    fn len_counts_inserts() {
        let store = InMemoryBlobStore::new();
        assert!(store.is_empty().unwrap());
        let a = store.insert("p", b"12345").unwrap();
        let b = store.insert("p", b"123456789").unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert!(store.contains(&a).unwrap() && store.contains(&b).unwrap());
    }

    #[test]
    fn concurrent_inserts_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryBlobStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.insert("p", &[i as u8]).unwrap())
            })
            .collect();
        let ids: Vec<BlobId> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert_eq!(store.len().unwrap(), 8);
        for id in ids {
            assert!(store.contains(&id).unwrap());
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlobStore::new();
        store.insert("p", b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlobStore"));
        assert!(debug.contains("blob_count"));
    }

    // -----------------------------------------------------------------------
    // Stamps
    // -----------------------------------------------------------------------

    #[test]
    fn stamp_ids_are_distinct_and_increasing() {
        let reg = InMemoryStampRegistry::new();
        let a = reg.insert("Rose", "p1", &[0b1010], 2).unwrap();
        let b = reg.insert("Crown", "p1", &[0b0101], 2).unwrap();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(reg.get(a).unwrap().unwrap().title, "Rose");
        assert_eq!(reg.get(b).unwrap().unwrap().design, vec![0b0101]);
    }

    #[test]
    fn stamp_missing_returns_none() {
        let reg = InMemoryStampRegistry::new();
        assert!(reg.get(StampId::new(99)).unwrap().is_none());
        assert!(reg.is_empty().unwrap());
    }
}
