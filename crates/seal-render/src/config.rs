use serde::{Deserialize, Serialize};

/// Generator and renderer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Node the stamp-face blocks hang from on the stamp tool.
    pub stamp_anchor: String,
    /// Wax node of a sealed container; also the first half of a split seal.
    pub wax_anchor: String,
    /// Second wax piece of an opened container.
    pub wax_piece_anchor: String,
    pub stamp_face_texture: String,
    /// Depth of the stamp-face blocks, below the anchor.
    pub stamp_relief: f64,
    /// Height of the impression decal above the wax surface.
    pub impression_relief: f64,
    /// Wax color used for impression textures when the item names none.
    pub default_wax_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stamp_anchor: "Stamp".into(),
            wax_anchor: "wax".into(),
            wax_piece_anchor: "waxPiece".into(),
            stamp_face_texture: "steel".into(),
            stamp_relief: 0.25,
            impression_relief: 0.05,
            default_wax_color: "red".into(),
        }
    }
}
