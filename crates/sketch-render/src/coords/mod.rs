//! Small value types shared by the renderer and its callers.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
