//! Native graphics API seam.
//!
//! Renderers are written against [`GlApi`]; this module provides the
//! implementation for `glow::Context` and the windowless [`HeadlessGl`].

mod api;
mod headless;
mod native;

pub use api::{BufferTarget, ClearMask, DepthFunc, GlApi, GlVersion, Primitive, ShaderStage};
pub use headless::{Framebuffer, GlCall, HeadlessGl, HeadlessHandle};
