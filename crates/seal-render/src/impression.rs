//! Turning a design grid into shape elements.
//!
//! Two kinds of geometry come out of a design:
//!
//! - **stamp face**: a small block per active cell hanging below the stamp
//!   tool's `Stamp` node, textured with a fixed metal texture;
//! - **wax impression**: a shallow raised decal per active cell on top of the
//!   wax node of a sealed container, textured `"{color}impression"`.
//!
//! Only cells inside the ellipse inscribed in the grid produce geometry, so a
//! square design always renders as a round seal. Coordinates of generated
//! elements are relative to the anchor's `from` corner; columns run along x,
//! rows along z.
//!
//! An opened container has its seal broken in two. In [`Placement::Split`]
//! columns `[0, ceil(d/2))` render on the `wax` node and `[ceil(d/2), d)` on
//! `waxPiece`, each half stretched over its own piece. The mask is still
//! evaluated in full-grid coordinates, so the halves form one circle.

use std::ops::Range;

use seal_types::DesignGrid;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::shape::{FaceSide, Shape, ShapeElement, ShapeFace};

const STAMP_FACE_SIDES: [FaceSide; 5] = [
    FaceSide::North,
    FaceSide::East,
    FaceSide::South,
    FaceSide::West,
    FaceSide::Down,
];

const IMPRESSION_SIDES: [FaceSide; 5] = [
    FaceSide::North,
    FaceSide::East,
    FaceSide::South,
    FaceSide::West,
    FaceSide::Up,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Whole design on the wax node.
    Single,
    /// Left half on the wax node, right half on the wax piece.
    Split,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImpressionStyle {
    StampFace,
    Wax { color: String, placement: Placement },
}

/// Whether cell `(row, col)` lies inside the ellipse inscribed in a
/// `dimensions`-sided grid.
pub fn in_mask(dimensions: usize, row: usize, col: usize) -> bool {
    let half = dimensions as f64 / 2.0;
    let u = (col as f64 + 0.5 - half) / half;
    let v = (row as f64 + 0.5 - half) / half;
    u * u + v * v <= 1.0
}

/// First column rendered on the second piece of a split seal.
pub fn split_column(dimensions: usize) -> usize {
    dimensions.div_ceil(2)
}

/// Texture token for the impression decal of a wax color.
pub fn impression_texture(color: &str) -> String {
    format!("{color}impression")
}

/// Applies designs to shape templates.
#[derive(Clone, Debug, Default)]
pub struct ImpressionGenerator {
    config: RenderConfig,
}

impl ImpressionGenerator {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The style a template supports, judged by which anchors it has.
    ///
    /// A `Stamp` node means a stamp tool. Otherwise a wax node (or wax piece)
    /// means a container seal, split when the wax piece is present.
    pub fn style_for(&self, template: &Shape, color: Option<&str>) -> Option<ImpressionStyle> {
        let c = &self.config;
        if template.find(&c.stamp_anchor).is_some() {
            return Some(ImpressionStyle::StampFace);
        }
        let has_wax = template.find(&c.wax_anchor).is_some();
        let has_piece = template.find(&c.wax_piece_anchor).is_some();
        if !has_wax && !has_piece {
            return None;
        }
        let placement = if has_piece {
            Placement::Split
        } else {
            Placement::Single
        };
        Some(ImpressionStyle::Wax {
            color: color.unwrap_or(&c.default_wax_color).to_string(),
            placement,
        })
    }

    /// Retexture every face of the wax nodes to `color`. Absent nodes are skipped.
    pub fn recolor_wax(&self, shape: &mut Shape, color: &str) {
        for name in [&self.config.wax_anchor, &self.config.wax_piece_anchor] {
            if let Some(element) = shape.find_mut(name) {
                element.retexture(color);
            }
        }
    }

    /// Apply `grid` to a copy of `template`.
    ///
    /// Fails only with [`RenderError::MissingAnchor`]; a split seal with one
    /// piece missing renders the half that is present.
    pub fn try_apply(
        &self,
        template: &Shape,
        grid: &DesignGrid,
        style: &ImpressionStyle,
    ) -> RenderResult<Shape> {
        let mut shape = template.clone();
        let d = grid.dimensions();
        let c = &self.config;

        match style {
            ImpressionStyle::StampFace => {
                let anchor = shape
                    .find_mut(&c.stamp_anchor)
                    .ok_or_else(|| RenderError::MissingAnchor(c.stamp_anchor.clone()))?;
                let generated = self.stamp_face_elements(anchor.size(), grid);
                debug!(count = generated.len(), "stamp face generated");
                anchor.children.extend(generated);
            }
            ImpressionStyle::Wax {
                color,
                placement: Placement::Single,
            } => {
                let anchor = shape
                    .find_mut(&c.wax_anchor)
                    .ok_or_else(|| RenderError::MissingAnchor(c.wax_anchor.clone()))?;
                let generated = self.impression_elements(anchor.size(), grid, color, 0..d);
                debug!(count = generated.len(), "impression generated");
                anchor.children.extend(generated);
            }
            ImpressionStyle::Wax {
                color,
                placement: Placement::Split,
            } => {
                let split = split_column(d);
                let mut placed = false;
                for (name, columns) in [(&c.wax_anchor, 0..split), (&c.wax_piece_anchor, split..d)] {
                    let Some(anchor) = shape.find_mut(name) else {
                        continue;
                    };
                    placed = true;
                    let generated = self.impression_elements(anchor.size(), grid, color, columns);
                    debug!(anchor = %name, count = generated.len(), "split impression generated");
                    anchor.children.extend(generated);
                }
                if !placed {
                    return Err(RenderError::MissingAnchor(c.wax_anchor.clone()));
                }
            }
        }
        Ok(shape)
    }

    /// Like [`try_apply`](Self::try_apply), but a missing anchor leaves the
    /// template unmodified.
    pub fn apply(&self, template: &Shape, grid: &DesignGrid, style: &ImpressionStyle) -> Shape {
        match self.try_apply(template, grid, style) {
            Ok(shape) => shape,
            Err(e) => {
                warn!(error = %e, "design not rendered");
                template.clone()
            }
        }
    }

    fn stamp_face_elements(&self, region: [f64; 3], grid: &DesignGrid) -> Vec<ShapeElement> {
        let d = grid.dimensions();
        let cell_x = region[0] / d as f64;
        let cell_z = region[2] / d as f64;
        let face = ShapeFace::new(&self.config.stamp_face_texture).with_uv([0.0, 0.0, 0.5, 0.5]);

        grid.active_cells()
            .filter(|&(row, col)| in_mask(d, row, col))
            .map(|(row, col)| {
                let x = col as f64 * cell_x;
                let z = row as f64 * cell_z;
                ShapeElement::new(
                    format!("StampFace{}", row * d + col),
                    [x, -self.config.stamp_relief, z],
                    [x + cell_x, 0.0, z + cell_z],
                )
                .with_faces(&STAMP_FACE_SIDES, &face)
            })
            .collect()
    }

    fn impression_elements(
        &self,
        region: [f64; 3],
        grid: &DesignGrid,
        color: &str,
        columns: Range<usize>,
    ) -> Vec<ShapeElement> {
        if columns.is_empty() {
            return Vec::new();
        }
        let d = grid.dimensions();
        let cell_x = region[0] / columns.len() as f64;
        let cell_z = region[2] / d as f64;
        let top = region[1];
        let face = ShapeFace::new(impression_texture(color));

        grid.active_cells()
            .filter(|&(row, col)| columns.contains(&col) && in_mask(d, row, col))
            .map(|(row, col)| {
                let x = (col - columns.start) as f64 * cell_x;
                let z = row as f64 * cell_z;
                ShapeElement::new(
                    format!("Impression{}", row * d + col),
                    [x, top, z],
                    [x + cell_x, top + self.config.impression_relief, z + cell_z],
                )
                .with_faces(&IMPRESSION_SIDES, &face)
            })
            .collect()
    }
}
