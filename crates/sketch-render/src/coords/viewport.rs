/// Viewport size in pixels.
///
/// Handed to `glViewport` at initialization; the backend rounds to whole
/// pixels and never passes a negative extent.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Whole-pixel extent `(width, height)`, clamped at zero.
    #[inline]
    pub fn to_pixels(self) -> (i32, i32) {
        if !self.is_valid() {
            return (0, 0);
        }
        (self.width.round() as i32, self.height.round() as i32)
    }
}
