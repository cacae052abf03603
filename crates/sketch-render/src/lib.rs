//! Sketch renderer crate.
//!
//! Draws filled and stroked triangle meshes for a creative-coding sketch
//! loop through an OpenGL-style API. Windowing, input and the sketch
//! lifecycle belong to the caller.

pub mod attrs;
pub mod coords;
pub mod gl;
pub mod logging;
pub mod render;
pub mod shape;

pub use attrs::SketchAttrs;
pub use render::{OpenGlRenderer, RenderError, Renderer};
pub use shape::{Geometry, Shape, ShapeKey};
