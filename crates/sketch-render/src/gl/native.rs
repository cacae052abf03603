//! [`GlApi`] over a real OpenGL context through `glow`.
//!
//! The `glow::Context` must be current on the calling thread for as long as a
//! renderer holds it. Context creation belongs to the windowing layer; every
//! raw call below relies on that invariant.

use glow::HasContext;

use super::api::{BufferTarget, ClearMask, DepthFunc, GlApi, GlVersion, Primitive, ShaderStage};

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn clear_bits(mask: ClearMask) -> u32 {
    let mut bits = 0;
    if mask.contains(ClearMask::COLOR) {
        bits |= glow::COLOR_BUFFER_BIT;
    }
    if mask.contains(ClearMask::DEPTH) {
        bits |= glow::DEPTH_BUFFER_BIT;
    }
    bits
}

impl GlApi for glow::Context {
    type Buffer = <glow::Context as HasContext>::Buffer;
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type VertexArray = <glow::Context as HasContext>::VertexArray;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn version(&self) -> GlVersion {
        let v = HasContext::version(self);
        GlVersion {
            major: v.major,
            minor: v.minor,
            is_embedded: v.is_embedded,
        }
    }

    fn enable_depth_test(&mut self, func: DepthFunc) {
        let func = match func {
            DepthFunc::LessEqual => glow::LEQUAL,
        };
        unsafe {
            self.enable(glow::DEPTH_TEST);
            self.depth_func(func);
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.viewport(x, y, width, height) }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let ty = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, ty) }
    }

    fn compile_shader(&mut self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            if self.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&mut self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn link_program(&mut self, program: Self::Program) -> Result<(), String> {
        unsafe {
            HasContext::link_program(self, program);
            if self.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.get_program_info_log(program))
            }
        }
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn uniform_1f(&mut self, location: &Self::UniformLocation, x: f32) {
        unsafe { self.uniform_1_f32(Some(location), x) }
    }

    fn uniform_2f(&mut self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { self.uniform_2_f32(Some(location), x, y) }
    }

    fn uniform_3f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { self.uniform_3_f32(Some(location), x, y, z) }
    }

    fn uniform_4f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe { self.uniform_4_f32(Some(location), x, y, z, w) }
    }

    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&mut self, vao: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vao) }
    }

    fn delete_vertex_array(&mut self, vao: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vao) }
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, buffer_target(target), buffer) }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(buffer_target(target), data, glow::STATIC_DRAW) }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn enable_vertex_attrib(&mut self, index: u32) {
        unsafe { self.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe { HasContext::vertex_attrib_pointer_f32(self, index, size, glow::FLOAT, false, stride, offset) }
    }

    fn draw_elements(&mut self, mode: Primitive, count: i32) {
        let mode = match mode {
            Primitive::Triangles => glow::TRIANGLES,
            Primitive::LineLoop => glow::LINE_LOOP,
        };
        unsafe { HasContext::draw_elements(self, mode, count, glow::UNSIGNED_INT, 0) }
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { HasContext::clear_color(self, r, g, b, a) }
    }

    fn clear(&mut self, mask: ClearMask) {
        unsafe { HasContext::clear(self, clear_bits(mask)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_bits_maps_both_planes() {
        assert_eq!(clear_bits(ClearMask::COLOR), glow::COLOR_BUFFER_BIT);
        assert_eq!(
            clear_bits(ClearMask::COLOR | ClearMask::DEPTH),
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT
        );
    }

    #[test]
    fn buffer_targets() {
        assert_eq!(buffer_target(BufferTarget::Vertex), glow::ARRAY_BUFFER);
        assert_eq!(buffer_target(BufferTarget::Index), glow::ELEMENT_ARRAY_BUFFER);
    }
}
