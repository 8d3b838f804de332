//! Design grids and the boolean bit codec.
//!
//! A design is a square boolean matrix stored row-major. On disk and on the
//! wire it travels as a flat bit sequence packed one bit per cell,
//! least-significant bit first within each byte; inside item metadata it
//! travels as a string of `'0'` and `'1'` characters. Both forms share the
//! same linear cell order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes needed to pack `bits` cells.
pub const fn packed_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Number of bytes a `dimensions x dimensions` design packs into.
pub const fn packed_len_for(dimensions: usize) -> usize {
    packed_len(dimensions * dimensions)
}

/// Pack a flat boolean sequence into bytes, LSB-first.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(bits.len())];
    for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        bytes[i / 8] |= 1 << (i % 8);
    }
    bytes
}

/// Unpack every bit of `bytes` (including padding) into a flat sequence.
pub fn unpack_bits(bytes: &[u8]) -> Vec<bool> {
    (0..bytes.len() * 8)
        .map(|i| bytes[i / 8] & (1 << (i % 8)) != 0)
        .collect()
}

/// Parse a `'0'`/`'1'` design string into a flat sequence.
pub fn parse_design_string(design: &str) -> Result<Vec<bool>, TypeError> {
    design
        .chars()
        .enumerate()
        .map(|(position, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            found => Err(TypeError::InvalidDesignChar { position, found }),
        })
        .collect()
}

/// Render a flat sequence as a `'0'`/`'1'` design string.
pub fn design_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// A square, row-major boolean design. `true` marks an engraved cell.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignGrid {
    dimensions: usize,
    cells: Vec<bool>,
}

impl DesignGrid {
    /// An empty (all-clear) grid of the given side length.
    pub fn new(dimensions: usize) -> Result<Self, TypeError> {
        if dimensions == 0 {
            return Err(TypeError::InvalidDimensions(dimensions));
        }
        Ok(Self {
            dimensions,
            cells: vec![false; dimensions * dimensions],
        })
    }

    /// Build a grid from a flat row-major sequence of exactly `dimensions²` cells.
    pub fn from_cells(dimensions: usize, cells: Vec<bool>) -> Result<Self, TypeError> {
        if dimensions == 0 {
            return Err(TypeError::InvalidDimensions(dimensions));
        }
        let required = dimensions * dimensions;
        if cells.len() != required {
            return Err(TypeError::DesignTooShort {
                dimensions,
                required,
                available: cells.len(),
            });
        }
        Ok(Self { dimensions, cells })
    }

    /// Build a grid from explicit rows. Every row must be as long as there are rows.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, TypeError> {
        let dimensions = rows.len();
        if dimensions == 0 {
            return Err(TypeError::InvalidDimensions(0));
        }
        let mut cells = Vec::with_capacity(dimensions * dimensions);
        for (row, cols) in rows.iter().enumerate() {
            let cols = cols.as_ref();
            if cols.len() != dimensions {
                return Err(TypeError::RaggedGrid {
                    row,
                    expected: dimensions,
                    actual: cols.len(),
                });
            }
            cells.extend_from_slice(cols);
        }
        Ok(Self { dimensions, cells })
    }

    /// Decode a packed design. Bits past `dimensions²` are ignored.
    pub fn unpack(bytes: &[u8], dimensions: usize) -> Result<Self, TypeError> {
        if dimensions == 0 {
            return Err(TypeError::InvalidDimensions(dimensions));
        }
        let required = dimensions * dimensions;
        let available = bytes.len() * 8;
        if available < required {
            return Err(TypeError::DesignTooShort {
                dimensions,
                required,
                available,
            });
        }
        let mut cells = unpack_bits(bytes);
        cells.truncate(required);
        Ok(Self { dimensions, cells })
    }

    /// Parse a `'0'`/`'1'` design string whose length is a perfect square.
    pub fn from_design_string(design: &str) -> Result<Self, TypeError> {
        let cells = parse_design_string(design)?;
        let dimensions = exact_sqrt(cells.len()).ok_or(TypeError::NotSquare(cells.len()))?;
        Self::from_cells(dimensions, cells)
    }

    /// Pack into `ceil(dimensions² / 8)` bytes.
    pub fn pack(&self) -> Vec<u8> {
        pack_bits(&self.cells)
    }

    /// The `'0'`/`'1'` string form used in item metadata.
    pub fn to_design_string(&self) -> String {
        design_string(&self.cells)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Cell value; out-of-range coordinates read as clear.
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row >= self.dimensions || col >= self.dimensions {
            return false;
        }
        self.cells[row * self.dimensions + col]
    }

    /// Set a cell.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(
            row < self.dimensions && col < self.dimensions,
            "cell ({row}, {col}) outside {0}x{0} grid",
            self.dimensions
        );
        self.cells[row * self.dimensions + col] = value;
    }

    /// Flat row-major view of the cells.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of engraved cells.
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// `(row, col)` of every engraved cell, in row-major order.
    pub fn active_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let d = self.dimensions;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i / d, i % d))
    }
}

impl fmt::Debug for DesignGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DesignGrid({0}x{0}, {1} active)",
            self.dimensions,
            self.active_count()
        )
    }
}

/// ASCII preview: `#` for engraved cells, `.` for clear ones.
impl fmt::Display for DesignGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.dimensions) {
            let line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn exact_sqrt(n: usize) -> Option<usize> {
    let root = (n as f64).sqrt().round() as usize;
    (root * root == n).then_some(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_grid() -> impl Strategy<Value = DesignGrid> {
        (1usize..=32).prop_flat_map(|d| {
            proptest::collection::vec(any::<bool>(), d * d)
                .prop_map(move |cells| DesignGrid::from_cells(d, cells).unwrap())
        })
    }

    proptest! {
        #[test]
        fn unpack_inverts_pack(grid in arb_grid()) {
            let packed = grid.pack();
            prop_assert_eq!(packed.len(), packed_len_for(grid.dimensions()));
            let back = DesignGrid::unpack(&packed, grid.dimensions()).unwrap();
            prop_assert_eq!(back, grid);
        }

        #[test]
        fn pack_reproduces_input_prefix(
            d in 1usize..=24,
            extra in 0usize..4,
            seed in proptest::collection::vec(any::<u8>(), 0..80),
        ) {
            let needed = packed_len_for(d) + extra;
            let mut bytes = seed;
            bytes.resize(needed, 0xA5);
            let repacked = DesignGrid::unpack(&bytes, d).unwrap().pack();

            let n = packed_len_for(d);
            let used_bits = d * d;
            let mut expected = bytes[..n].to_vec();
            if used_bits % 8 != 0 {
                expected[n - 1] &= (1u8 << (used_bits % 8)) - 1;
            }
            prop_assert_eq!(repacked, expected);
        }

        #[test]
        fn design_string_roundtrip(grid in arb_grid()) {
            let s = grid.to_design_string();
            prop_assert_eq!(DesignGrid::from_design_string(&s).unwrap(), grid);
        }
    }

    #[test]
    fn packs_lsb_first() {
        let bits = [true, false, false, false, false, false, false, false, false, true];
        assert_eq!(pack_bits(&bits), vec![0b0000_0001, 0b0000_0010]);
    }

    #[test]
    fn unpack_rejects_short_input() {
        let err = DesignGrid::unpack(&[0u8; 31], 16).unwrap_err();
        assert_eq!(
            err,
            TypeError::DesignTooShort {
                dimensions: 16,
                required: 256,
                available: 248,
            }
        );
    }

    #[test]
    fn unpack_ignores_trailing_bits() {
        // 3x3 needs 9 bits; everything past bit 9 is set but must not leak in.
        let grid = DesignGrid::unpack(&[0b0000_0001, 0xFE, 0xFF], 3).unwrap();
        assert_eq!(grid.active_count(), 1);
        assert!(grid.get(0, 0));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(DesignGrid::new(0).unwrap_err(), TypeError::InvalidDimensions(0));
        assert!(DesignGrid::unpack(&[], 0).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![true, false], vec![true]];
        let err = DesignGrid::from_rows(&rows).unwrap_err();
        assert!(matches!(err, TypeError::RaggedGrid { row: 1, .. }));
    }

    #[test]
    fn design_string_rejects_bad_chars() {
        let err = DesignGrid::from_design_string("01x1").unwrap_err();
        assert_eq!(err, TypeError::InvalidDesignChar { position: 2, found: 'x' });
    }

    #[test]
    fn design_string_must_be_square() {
        assert_eq!(
            DesignGrid::from_design_string("01101").unwrap_err(),
            TypeError::NotSquare(5)
        );
    }

    #[test]
    fn row_major_layout() {
        let mut grid = DesignGrid::new(3).unwrap();
        grid.set(1, 2, true);
        assert_eq!(grid.to_design_string(), "000001000");
        assert_eq!(grid.active_cells().collect::<Vec<_>>(), vec![(1, 2)]);
    }

    #[test]
    fn out_of_range_reads_clear() {
        let grid = DesignGrid::new(2).unwrap();
        assert!(!grid.get(5, 0));
    }

    #[test]
    fn display_draws_rows() {
        let grid = DesignGrid::from_design_string("1001").unwrap();
        assert_eq!(grid.to_string(), "#.\n.#\n");
    }

    #[test]
    fn flat_bits_match_grid_layout() {
        let grid = DesignGrid::from_design_string("0110").unwrap();
        assert_eq!(pack_bits(grid.cells()), grid.pack());
        assert_eq!(&unpack_bits(&grid.pack())[..4], grid.cells());
    }
}
