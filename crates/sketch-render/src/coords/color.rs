/// RGBA color with channels normalized to `[0, 1]`.
///
/// This is the form the GL backend uploads to shaders and passes to
/// `glClearColor`. Sketch-level color models (HSB, 0..255 ranges) live outside
/// this crate and convert into `ColorRgba` before rendering.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from three channels.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque gray.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Creates a color from 8-bit channels (`0`–`255`).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Channels clamped to `[0, 1]`, in `[r, g, b, a]` order.
    #[inline]
    pub fn normalized(self) -> [f32; 4] {
        [
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba8_maps_full_range() {
        let c = ColorRgba::from_rgba8(255, 0, 51, 255);
        assert_eq!(c, ColorRgba::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn normalized_clamps_out_of_range_channels() {
        let c = ColorRgba::new(1.5, -0.25, 0.5, 2.0);
        assert_eq!(c.normalized(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn gray_is_opaque() {
        assert_eq!(ColorRgba::gray(0.8).a, 1.0);
    }
}
