//! Renderer lifecycle and the OpenGL-style shape backend.
//!
//! Convention:
//! - shape positions are already in clip space; no transform is applied.
//! - colors reach shaders as normalized RGBA through the `fill_color` uniform.

mod cache;
mod error;
mod opengl;
mod renderer;
pub mod shader;

pub use cache::{BufferCache, CacheEntry};
pub use error::RenderError;
pub use opengl::{FrameStats, OpenGlRenderer};
pub use renderer::Renderer;
