//! Named-node shape model.
//!
//! A subset of the host's JSON shape format: every element has a name, an
//! axis-aligned box (`from`/`to`), per-side faces and child elements. Unknown
//! keys in the source JSON are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RenderResult;

/// Side of an element box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSide {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceSide {
    pub const ALL: [FaceSide; 6] = [
        FaceSide::North,
        FaceSide::East,
        FaceSide::South,
        FaceSide::West,
        FaceSide::Up,
        FaceSide::Down,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeFace {
    pub texture: String,
    #[serde(default = "full_uv")]
    pub uv: [f32; 4],
}

fn full_uv() -> [f32; 4] {
    [0.0, 0.0, 16.0, 16.0]
}

impl ShapeFace {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            uv: full_uv(),
        }
    }

    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = uv;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub name: String,
    pub from: [f64; 3],
    pub to: [f64; 3],
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub faces: BTreeMap<FaceSide, ShapeFace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ShapeElement>,
}

impl ShapeElement {
    pub fn new(name: impl Into<String>, from: [f64; 3], to: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            faces: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Put `face` on each of `sides`.
    pub fn with_faces(mut self, sides: &[FaceSide], face: &ShapeFace) -> Self {
        for side in sides {
            self.faces.insert(*side, face.clone());
        }
        self
    }

    /// Extent along x, y and z.
    pub fn size(&self) -> [f64; 3] {
        [
            self.to[0] - self.from[0],
            self.to[1] - self.from[1],
            self.to[2] - self.from[2],
        ]
    }

    /// Depth-first search of this element and its descendants.
    pub fn find(&self, name: &str) -> Option<&ShapeElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ShapeElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    /// Replace the texture on every face.
    pub fn retexture(&mut self, texture: &str) {
        for face in self.faces.values_mut() {
            face.texture = texture.to_string();
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(ShapeElement::count).sum::<usize>()
    }
}

/// A tree of named elements, as loaded from a shape template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default)]
    pub elements: Vec<ShapeElement>,
}

impl Shape {
    pub fn new(elements: Vec<ShapeElement>) -> Self {
        Self { elements }
    }

    pub fn from_json(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// First element named `name`, searching each root depth-first.
    pub fn find(&self, name: &str) -> Option<&ShapeElement> {
        self.elements.iter().find_map(|e| e.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ShapeElement> {
        self.elements.iter_mut().find_map(|e| e.find_mut(name))
    }

    /// Total number of elements at every depth.
    pub fn element_count(&self) -> usize {
        self.elements.iter().map(ShapeElement::count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r##"{
        "textureWidth": 16,
        "elements": [
            {
                "name": "body",
                "from": [0, 0, 0],
                "to": [16, 1, 10],
                "faces": {
                    "up": { "texture": "#paper", "uv": [0, 0, 16, 10] },
                    "down": { "texture": "#paper" }
                },
                "children": [
                    {
                        "name": "wax",
                        "from": [6, 1, 3],
                        "to": [10, 1.5, 7],
                        "faces": { "up": { "texture": "#wax" }, "north": { "texture": "#wax" } }
                    }
                ]
            }
        ]
    }"##;

    #[test]
    fn parses_host_json_and_ignores_unknown_keys() {
        let shape = Shape::from_json(ENVELOPE).unwrap();
        assert_eq!(shape.element_count(), 2);
        let wax = shape.find("wax").unwrap();
        assert_eq!(wax.from, [6.0, 1.0, 3.0]);
        assert_eq!(wax.size(), [4.0, 0.5, 4.0]);
        assert_eq!(wax.faces[&FaceSide::Up].texture, "#wax");
        let body = shape.find("body").unwrap();
        assert_eq!(body.faces[&FaceSide::Down].uv, [0.0, 0.0, 16.0, 16.0]);
    }

    #[test]
    fn find_missing_is_none() {
        let shape = Shape::from_json(ENVELOPE).unwrap();
        assert!(shape.find("Stamp").is_none());
    }

    #[test]
    fn retexture_touches_only_that_element() {
        let mut shape = Shape::from_json(ENVELOPE).unwrap();
        shape.find_mut("wax").unwrap().retexture("blue");
        let wax = shape.find("wax").unwrap();
        assert!(wax.faces.values().all(|f| f.texture == "blue"));
        assert_eq!(shape.find("body").unwrap().faces[&FaceSide::Up].texture, "#paper");
    }

    #[test]
    fn json_roundtrip() {
        let shape = Shape::from_json(ENVELOPE).unwrap();
        let again = Shape::from_json(&shape.to_json().unwrap()).unwrap();
        assert_eq!(shape, again);
    }

    #[test]
    fn malformed_json_is_shape_error() {
        let err = Shape::from_json("{ \"elements\": 3 }").unwrap_err();
        assert!(matches!(err, crate::RenderError::Shape(_)));
    }
}
