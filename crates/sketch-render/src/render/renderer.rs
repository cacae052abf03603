use crate::attrs::SketchAttrs;
use crate::shape::Geometry;

use super::RenderError;

/// Lifecycle contract every rendering backend implements.
///
/// The sketch driver calls `initialize` once, then per frame `pre_render`,
/// any number of `clear`/`render`, `post_render`, and finally `cleanup`.
/// All calls happen on the thread that owns the graphics context.
pub trait Renderer {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Fails with [`RenderError::Unsupported`] when the context cannot run
    /// this backend.
    fn check_support(&self) -> Result<(), RenderError>;

    /// One-time setup. Fatal on error.
    fn initialize(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError>;

    /// Runs before anything is drawn in the current frame.
    fn pre_render(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Draws one shape with the fill/stroke state in `attrs`.
    fn render(&mut self, shape: &dyn Geometry, attrs: &SketchAttrs) -> Result<(), RenderError>;

    /// Runs after the last draw of the current frame.
    fn post_render(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Clears the frame to `attrs.background_color`.
    fn clear(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError>;

    /// Final teardown, releasing every GPU object the backend owns.
    fn cleanup(&mut self) -> Result<(), RenderError>;

    /// Draws a built-in test pattern so a backend can be checked without any
    /// sketch geometry.
    fn test_render(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError> {
        let _ = attrs;
        Err(RenderError::Unimplemented("test_render"))
    }
}
