use std::fmt;

use serde::{Deserialize, Serialize};
use seal_types::{DesignGrid, TypeError};

use crate::hasher::ContentHasher;

/// Short, stable content hash of a packed design.
///
/// Used to tell designs apart in geometry cache keys. It is not a security
/// boundary: a collision costs a wrong cached mesh, nothing more.
///
/// The hash input is the side length followed by the packed bytes, so a
/// grid, its packed bytes and its `'0'/'1'` string all yield the same
/// fingerprint, while a 1x1 and a 2x2 design that pack to the same byte
/// do not.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignFingerprint(String);

impl DesignFingerprint {
    /// Length of a fingerprint in hex characters.
    pub const LEN: usize = 16;

    /// Fingerprint already-packed design bytes of a `dimensions`-sided grid.
    pub fn of_packed(packed: &[u8], dimensions: usize) -> Self {
        let side = u32::try_from(dimensions).unwrap_or(u32::MAX);
        let mut input = Vec::with_capacity(4 + packed.len());
        input.extend_from_slice(&side.to_be_bytes());
        input.extend_from_slice(packed);
        let digest = ContentHasher::DESIGN.hash(&input);
        Self(hex::encode(&digest[..Self::LEN / 2]))
    }

    pub fn of_grid(grid: &DesignGrid) -> Self {
        Self::of_packed(&grid.pack(), grid.dimensions())
    }

    /// Fingerprint a `'0'/'1'` design string.
    pub fn of_design_string(design: &str) -> Result<Self, TypeError> {
        Ok(Self::of_grid(&DesignGrid::from_design_string(design)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DesignFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DesignFingerprint({})", self.0)
    }
}

impl fmt::Display for DesignFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(d: usize) -> DesignGrid {
        let mut grid = DesignGrid::new(d).unwrap();
        for row in 0..d {
            for col in 0..d {
                grid.set(row, col, (row + col) % 2 == 0);
            }
        }
        grid
    }

    #[test]
    fn fingerprint_is_16_hex_chars() {
        let fp = DesignFingerprint::of_grid(&checker(16));
        assert_eq!(fp.as_str().len(), DesignFingerprint::LEN);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(
            DesignFingerprint::of_grid(&checker(16)),
            DesignFingerprint::of_grid(&checker(16))
        );
    }

    #[test]
    fn all_forms_agree() {
        let grid = checker(5);
        let from_grid = DesignFingerprint::of_grid(&grid);
        let from_bytes = DesignFingerprint::of_packed(&grid.pack(), 5);
        let from_string = DesignFingerprint::of_design_string(&grid.to_design_string()).unwrap();
        assert_eq!(from_grid, from_bytes);
        assert_eq!(from_grid, from_string);
    }

    #[test]
    fn single_cell_changes_fingerprint() {
        let a = checker(16);
        let mut b = a.clone();
        b.set(15, 15, !a.get(15, 15));
        assert_ne!(DesignFingerprint::of_grid(&a), DesignFingerprint::of_grid(&b));
    }

    #[test]
    fn distinct_single_cell_designs_do_not_collide() {
        let mut seen = std::collections::HashSet::new();
        for cell in 0..256 {
            let mut grid = DesignGrid::new(16).unwrap();
            grid.set(cell / 16, cell % 16, true);
            assert!(seen.insert(DesignFingerprint::of_grid(&grid)));
        }
    }

    #[test]
    fn invalid_design_string_is_rejected() {
        assert!(DesignFingerprint::of_design_string("01a").is_err());
        assert!(DesignFingerprint::of_design_string("010").is_err());
    }

    #[test]
    fn side_length_is_part_of_the_hash() {
        // Both pack to the single byte 0x01.
        let one = DesignFingerprint::of_design_string("1").unwrap();
        let two = DesignFingerprint::of_design_string("1000").unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn serializes_as_plain_string() {
        let fp = DesignFingerprint::of_packed(&[1, 2, 3], 4);
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
    }
}
