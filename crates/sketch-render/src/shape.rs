//! Geometry consumed by renderers.
//!
//! Shapes are built by the sketch's geometry layer and handed to a renderer
//! once per frame. Renderers identify a shape by its content fingerprint so the
//! same geometry submitted on every frame is uploaded only once.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Deterministic content fingerprint of a piece of geometry.
///
/// Two geometries with identical vertex and face data always produce the same
/// key. Coordinates are hashed by bit pattern, so `0.0` and `-0.0` differ.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShapeKey(pub u64);

/// Triangle-mesh geometry: 3D positions and index triples into them.
pub trait Geometry {
    fn vertices(&self) -> &[[f32; 3]];

    fn faces(&self) -> &[[u32; 3]];

    /// Number of indices a draw of the full mesh covers.
    fn element_count(&self) -> usize {
        self.faces().len() * 3
    }

    /// Content fingerprint used as the renderer's cache key.
    fn fingerprint(&self) -> ShapeKey {
        fingerprint_of(self.vertices(), self.faces())
    }
}

/// Hashes vertex bits and face indices, length-prefixed so that moving data
/// between the two lists changes the key.
pub fn fingerprint_of(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> ShapeKey {
    let mut h = DefaultHasher::new();

    vertices.len().hash(&mut h);
    for v in vertices {
        for c in v {
            c.to_bits().hash(&mut h);
        }
    }

    faces.len().hash(&mut h);
    for f in faces {
        f.hash(&mut h);
    }

    ShapeKey(h.finish())
}

/// Immutable triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
}

impl Shape {
    /// Face indices are not validated against the vertex list.
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Axis-aligned rectangle in clip space with its top-left corner at
    /// `(x, y)`, extending `w` to the right and `h` downwards.
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(
            vec![
                [x, y, 0.0],
                [x + w, y, 0.0],
                [x + w, y - h, 0.0],
                [x, y - h, 0.0],
            ],
            vec![[0, 1, 2], [2, 3, 0]],
        )
    }
}

impl Geometry for Shape {
    #[inline]
    fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    #[inline]
    fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }
}
