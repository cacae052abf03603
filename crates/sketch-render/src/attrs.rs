use crate::coords::{ColorRgba, Viewport};

/// Sketch-wide drawing state read by renderers.
///
/// Owned by the sketch driver and passed into every renderer call. Renderers
/// never mutate it; changing the fill color between two `render` calls is how
/// a sketch draws shapes in different colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SketchAttrs {
    pub viewport: Viewport,

    pub fill_enabled: bool,
    pub fill_color: ColorRgba,

    pub stroke_enabled: bool,
    pub stroke_color: ColorRgba,

    pub background_color: ColorRgba,
}

impl Default for SketchAttrs {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(100.0, 100.0),
            fill_enabled: true,
            fill_color: ColorRgba::white(),
            stroke_enabled: true,
            stroke_color: ColorRgba::black(),
            background_color: ColorRgba::gray(0.8),
        }
    }
}

impl SketchAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Enables fill with `color`.
    pub fn fill(mut self, color: ColorRgba) -> Self {
        self.fill_enabled = true;
        self.fill_color = color;
        self
    }

    pub fn no_fill(mut self) -> Self {
        self.fill_enabled = false;
        self
    }

    /// Enables stroke with `color`.
    pub fn stroke(mut self, color: ColorRgba) -> Self {
        self.stroke_enabled = true;
        self.stroke_color = color;
        self
    }

    pub fn no_stroke(mut self) -> Self {
        self.stroke_enabled = false;
        self
    }

    pub fn background(mut self, color: ColorRgba) -> Self {
        self.background_color = color;
        self
    }

    /// `true` when neither fill nor stroke would produce output.
    #[inline]
    pub fn draws_nothing(&self) -> bool {
        !self.fill_enabled && !self.stroke_enabled
    }
}
