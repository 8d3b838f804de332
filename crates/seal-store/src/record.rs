use seal_types::{BlobId, DesignGrid, StampId, TypeError};

/// Creator recorded for blobs ingested from the legacy flat-file layout.
pub const LEGACY_CREATOR: &str = "legacy";

/// The sealed contents of one container.
///
/// The store never interprets `payload`; it is whatever the item layer
/// serialized when the container was filled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobRecord {
    pub id: BlobId,
    pub creator_id: String,
    pub payload: Vec<u8>,
}

/// A registered stamp design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StampRecord {
    pub id: StampId,
    pub title: String,
    pub creator_id: String,
    /// Packed design, `ceil(dimensions² / 8)` bytes when written through the codec.
    pub design: Vec<u8>,
    pub dimensions: u32,
}

impl StampRecord {
    /// Decode the packed design.
    pub fn grid(&self) -> Result<DesignGrid, TypeError> {
        DesignGrid::unpack(&self.design, self.dimensions as usize)
    }

    /// The design in its `'0'/'1'` item-metadata form.
    pub fn design_string(&self) -> Result<String, TypeError> {
        Ok(self.grid()?.to_design_string())
    }
}
