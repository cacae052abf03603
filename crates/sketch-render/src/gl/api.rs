use std::fmt::Debug;
use std::ops::BitOr;

/// Version reported by the GL context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
    /// OpenGL ES / WebGL rather than desktop GL.
    pub is_embedded: bool,
}

impl GlVersion {
    #[inline]
    pub const fn desktop(major: u32, minor: u32) -> Self {
        Self { major, minor, is_embedded: false }
    }

    #[inline]
    pub fn at_least(self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

impl std::fmt::Display for GlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_embedded {
            write!(f, "ES {}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Vertex,
    /// `GL_ELEMENT_ARRAY_BUFFER`
    Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Triangles,
    LineLoop,
}

/// Depth comparison. `LessEqual` lets coplanar shapes drawn later win.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthFunc {
    LessEqual,
}

/// Buffers cleared by [`GlApi::clear`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearMask(u8);

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask(0b01);
    pub const DEPTH: ClearMask = ClearMask(0b10);

    #[inline]
    pub fn contains(self, other: ClearMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ClearMask {
    type Output = ClearMask;

    fn bitor(self, rhs: ClearMask) -> ClearMask {
        ClearMask(self.0 | rhs.0)
    }
}

/// The subset of an OpenGL-style API the shape renderer drives.
///
/// Implemented for `glow::Context` (real GL) and for
/// [`HeadlessGl`](super::HeadlessGl). Calls map one-to-one onto GL entry
/// points; implementations must be driven from the thread that owns the
/// context.
///
/// Status queries (compile, link) are folded into the calls that can fail and
/// return the driver's info log as the error.
pub trait GlApi {
    type Buffer: Copy + Eq + Debug;
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;
    type VertexArray: Copy + Eq + Debug;
    type UniformLocation: Clone + Debug;

    fn version(&self) -> GlVersion;

    fn enable_depth_test(&mut self, func: DepthFunc);
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads `source` and compiles it. `Err` carries the info log.
    fn compile_shader(&mut self, shader: Self::Shader, source: &str) -> Result<(), String>;
    fn delete_shader(&mut self, shader: Self::Shader);

    fn create_program(&mut self) -> Result<Self::Program, String>;
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    /// Links the attached shaders. `Err` carries the info log.
    fn link_program(&mut self, program: Self::Program) -> Result<(), String>;
    fn use_program(&mut self, program: Option<Self::Program>);
    fn delete_program(&mut self, program: Self::Program);

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    fn uniform_1f(&mut self, location: &Self::UniformLocation, x: f32);
    fn uniform_2f(&mut self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);

    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&mut self, vao: Option<Self::VertexArray>);
    fn delete_vertex_array(&mut self, vao: Self::VertexArray);

    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Static-draw upload into the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    fn enable_vertex_attrib(&mut self, index: u32);
    /// Float attribute of `size` components read from the bound vertex buffer.
    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32);

    /// Indexed draw using `u32` indices from the bound index buffer.
    fn draw_elements(&mut self, mode: Primitive, count: i32);

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&mut self, mask: ClearMask);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(GlVersion::desktop(3, 3).at_least(3, 0));
        assert!(GlVersion::desktop(4, 1).at_least(3, 3));
        assert!(!GlVersion::desktop(2, 1).at_least(3, 0));
    }

    #[test]
    fn clear_mask_union() {
        let m = ClearMask::COLOR | ClearMask::DEPTH;
        assert!(m.contains(ClearMask::COLOR));
        assert!(m.contains(ClearMask::DEPTH));
        assert!(!ClearMask::COLOR.contains(ClearMask::DEPTH));
    }
}
