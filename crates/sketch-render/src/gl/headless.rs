//! Recording [`GlApi`] implementation with no GPU behind it.
//!
//! `HeadlessGl` keeps just enough GL object state to behave like a driver
//! (handles, buffer contents, compile/link status, bound objects) and logs
//! every state-changing call. Drivers use it to run sketches without a
//! window; tests use it to assert on the exact call stream.
//!
//! Shader "compilation" is a declaration scan: a source compiles when it
//! contains a `main` function, `uniform <type> <name>;` lines declare uniforms
//! and `in <type> <name>;` lines in vertex shaders declare attributes.

use std::collections::{HashMap, HashSet};

use super::api::{BufferTarget, ClearMask, DepthFunc, GlApi, GlVersion, Primitive, ShaderStage};

/// Object handle handed out by [`HeadlessGl`]. Never zero.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct HeadlessHandle(pub u32);

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    EnableDepthTest(DepthFunc),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    CompileShader { shader: HeadlessHandle, stage: ShaderStage },
    AttachShader { program: HeadlessHandle, shader: HeadlessHandle },
    LinkProgram(HeadlessHandle),
    UseProgram(Option<HeadlessHandle>),
    Uniform { location: u32, values: Vec<f32> },
    CreateBuffer(HeadlessHandle),
    BindVertexArray(Option<HeadlessHandle>),
    BindBuffer { target: BufferTarget, buffer: Option<HeadlessHandle> },
    BufferData { target: BufferTarget, len: usize },
    EnableVertexAttrib(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    DrawElements { mode: Primitive, count: i32 },
    ClearColor([f32; 4]),
    Clear(ClearMask),
    DeleteShader(HeadlessHandle),
    DeleteProgram(HeadlessHandle),
    DeleteVertexArray(HeadlessHandle),
    DeleteBuffer(HeadlessHandle),
}

/// Simulated default framebuffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Framebuffer {
    /// Color written by the last color clear.
    pub color: [f32; 4],
    /// Draw calls issued since that clear.
    pub draws_since_clear: usize,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    compiled: bool,
    uniforms: Vec<String>,
    attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<HeadlessHandle>,
    linked: bool,
    uniforms: Vec<(String, u32)>,
    attributes: Vec<String>,
}

#[derive(Debug)]
pub struct HeadlessGl {
    version: GlVersion,
    next_handle: u32,
    next_uniform_location: u32,

    shaders: HashMap<HeadlessHandle, ShaderObject>,
    programs: HashMap<HeadlessHandle, ProgramObject>,
    vertex_arrays: HashSet<HeadlessHandle>,
    buffers: HashMap<HeadlessHandle, Vec<u8>>,

    current_program: Option<HeadlessHandle>,
    bound_vertex: Option<HeadlessHandle>,
    bound_index: Option<HeadlessHandle>,
    uniform_values: HashMap<u32, Vec<f32>>,

    viewport: (i32, i32, i32, i32),
    clear_color: [f32; 4],
    framebuffer: Framebuffer,

    fail_link: Option<String>,
    calls: Vec<GlCall>,
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGl {
    /// Context reporting desktop GL 3.3.
    pub fn new() -> Self {
        Self::with_version(GlVersion::desktop(3, 3))
    }

    pub fn with_version(version: GlVersion) -> Self {
        Self {
            version,
            next_handle: 1,
            next_uniform_location: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            vertex_arrays: HashSet::new(),
            buffers: HashMap::new(),
            current_program: None,
            bound_vertex: None,
            bound_index: None,
            uniform_values: HashMap::new(),
            viewport: (0, 0, 0, 0),
            clear_color: [0.0; 4],
            framebuffer: Framebuffer {
                color: [0.0; 4],
                draws_since_clear: 0,
            },
            fail_link: None,
            calls: Vec::new(),
        }
    }

    /// Makes the next `link_program` fail with `log`.
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.fail_link = Some(log.into());
    }

    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drops the call log, keeping object state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// `(mode, count)` of every recorded draw, in order.
    pub fn draws(&self) -> Vec<(Primitive, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawElements { mode, count } => Some((*mode, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self, mode: Primitive) -> usize {
        self.draws().iter().filter(|(m, _)| *m == mode).count()
    }

    /// Buffers created and not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_contents(&self, buffer: HeadlessHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<HeadlessHandle> {
        self.current_program
    }

    /// Last values written to a uniform location.
    pub fn uniform_value(&self, location: u32) -> Option<&[f32]> {
        self.uniform_values.get(&location).map(Vec::as_slice)
    }

    pub fn viewport(&self) -> (i32, i32, i32, i32) {
        self.viewport
    }

    pub fn framebuffer(&self) -> Framebuffer {
        self.framebuffer
    }

    fn alloc_handle(&mut self) -> HeadlessHandle {
        let h = HeadlessHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn bound(&self, target: BufferTarget) -> Option<HeadlessHandle> {
        match target {
            BufferTarget::Vertex => self.bound_vertex,
            BufferTarget::Index => self.bound_index,
        }
    }

    fn write_uniform(&mut self, location: u32, values: Vec<f32>) {
        self.calls.push(GlCall::Uniform {
            location,
            values: values.clone(),
        });
        self.uniform_values.insert(location, values);
    }
}

/// Third token of a `<keyword> <type> <name>;` declaration.
fn declared_name<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != keyword {
        return None;
    }
    let _ty = tokens.next()?;
    let name = tokens.next()?.trim_end_matches(';');
    if name.is_empty() { None } else { Some(name) }
}

fn has_main(source: &str) -> bool {
    source
        .lines()
        .any(|l| l.trim_start().starts_with("void main"))
}

impl GlApi for HeadlessGl {
    type Buffer = HeadlessHandle;
    type Shader = HeadlessHandle;
    type Program = HeadlessHandle;
    type VertexArray = HeadlessHandle;
    type UniformLocation = u32;

    fn version(&self) -> GlVersion {
        self.version
    }

    fn enable_depth_test(&mut self, func: DepthFunc) {
        self.calls.push(GlCall::EnableDepthTest(func));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = (x, y, width, height);
        self.calls.push(GlCall::Viewport { x, y, width, height });
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let h = self.alloc_handle();
        self.shaders.insert(
            h,
            ShaderObject {
                stage,
                compiled: false,
                uniforms: Vec::new(),
                attributes: Vec::new(),
            },
        );
        Ok(h)
    }

    fn compile_shader(&mut self, shader: Self::Shader, source: &str) -> Result<(), String> {
        let Some(obj) = self.shaders.get_mut(&shader) else {
            return Err(format!("invalid shader object {}", shader.0));
        };
        self.calls.push(GlCall::CompileShader {
            shader,
            stage: obj.stage,
        });

        if !has_main(source) {
            obj.compiled = false;
            return Err("0:1(1): error: no function `main` defined".to_string());
        }

        obj.uniforms = source
            .lines()
            .filter_map(|l| declared_name(l, "uniform"))
            .map(str::to_string)
            .collect();
        obj.attributes = match obj.stage {
            ShaderStage::Vertex => source
                .lines()
                .filter_map(|l| declared_name(l, "in"))
                .map(str::to_string)
                .collect(),
            ShaderStage::Fragment => Vec::new(),
        };
        obj.compiled = true;
        Ok(())
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        if self.shaders.remove(&shader).is_some() {
            self.calls.push(GlCall::DeleteShader(shader));
        }
    }

    fn create_program(&mut self) -> Result<Self::Program, String> {
        let h = self.alloc_handle();
        self.programs.insert(h, ProgramObject::default());
        Ok(h)
    }

    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        if let Some(p) = self.programs.get_mut(&program) {
            p.attached.push(shader);
            self.calls.push(GlCall::AttachShader { program, shader });
        }
    }

    fn link_program(&mut self, program: Self::Program) -> Result<(), String> {
        self.calls.push(GlCall::LinkProgram(program));

        if let Some(log) = self.fail_link.take() {
            return Err(log);
        }

        let Some(p) = self.programs.get(&program) else {
            return Err(format!("invalid program object {}", program.0));
        };

        let mut has_vertex = false;
        let mut has_fragment = false;
        let mut uniforms: Vec<String> = Vec::new();
        let mut attributes: Vec<String> = Vec::new();

        for sh in &p.attached {
            let Some(obj) = self.shaders.get(sh) else {
                return Err(format!("attached shader {} was deleted", sh.0));
            };
            if !obj.compiled {
                return Err(format!("{} shader {} is not compiled", obj.stage, sh.0));
            }
            match obj.stage {
                ShaderStage::Vertex => has_vertex = true,
                ShaderStage::Fragment => has_fragment = true,
            }
            for u in &obj.uniforms {
                if !uniforms.contains(u) {
                    uniforms.push(u.clone());
                }
            }
            attributes.extend(obj.attributes.iter().cloned());
        }

        if !has_vertex || !has_fragment {
            return Err("error: program needs both a vertex and a fragment shader".to_string());
        }

        let uniforms = uniforms
            .into_iter()
            .map(|name| {
                let loc = self.next_uniform_location;
                self.next_uniform_location += 1;
                (name, loc)
            })
            .collect();

        if let Some(p) = self.programs.get_mut(&program) {
            p.linked = true;
            p.uniforms = uniforms;
            p.attributes = attributes;
        }
        Ok(())
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        self.current_program = program;
        self.calls.push(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: Self::Program) {
        if self.programs.remove(&program).is_some() {
            if self.current_program == Some(program) {
                self.current_program = None;
            }
            self.calls.push(GlCall::DeleteProgram(program));
        }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        let p = self.programs.get(&program).filter(|p| p.linked)?;
        p.uniforms.iter().find(|(n, _)| n == name).map(|(_, loc)| *loc)
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let p = self.programs.get(&program).filter(|p| p.linked)?;
        p.attributes.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn uniform_1f(&mut self, location: &Self::UniformLocation, x: f32) {
        self.write_uniform(*location, vec![x]);
    }

    fn uniform_2f(&mut self, location: &Self::UniformLocation, x: f32, y: f32) {
        self.write_uniform(*location, vec![x, y]);
    }

    fn uniform_3f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        self.write_uniform(*location, vec![x, y, z]);
    }

    fn uniform_4f(&mut self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.write_uniform(*location, vec![x, y, z, w]);
    }

    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, String> {
        let h = self.alloc_handle();
        self.vertex_arrays.insert(h);
        Ok(h)
    }

    fn bind_vertex_array(&mut self, vao: Option<Self::VertexArray>) {
        self.calls.push(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&mut self, vao: Self::VertexArray) {
        if self.vertex_arrays.remove(&vao) {
            self.calls.push(GlCall::DeleteVertexArray(vao));
        }
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, String> {
        let h = self.alloc_handle();
        self.buffers.insert(h, Vec::new());
        self.calls.push(GlCall::CreateBuffer(h));
        Ok(h)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        match target {
            BufferTarget::Vertex => self.bound_vertex = buffer,
            BufferTarget::Index => self.bound_index = buffer,
        }
        self.calls.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        if let Some(h) = self.bound(target) {
            if let Some(store) = self.buffers.get_mut(&h) {
                store.clear();
                store.extend_from_slice(data);
            }
        }
        self.calls.push(GlCall::BufferData {
            target,
            len: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        if self.buffers.remove(&buffer).is_some() {
            if self.bound_vertex == Some(buffer) {
                self.bound_vertex = None;
            }
            if self.bound_index == Some(buffer) {
                self.bound_index = None;
            }
            self.calls.push(GlCall::DeleteBuffer(buffer));
        }
    }

    fn enable_vertex_attrib(&mut self, index: u32) {
        self.calls.push(GlCall::EnableVertexAttrib(index));
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32) {
        self.calls.push(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn draw_elements(&mut self, mode: Primitive, count: i32) {
        self.framebuffer.draws_since_clear += 1;
        self.calls.push(GlCall::DrawElements { mode, count });
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = [r, g, b, a];
        self.calls.push(GlCall::ClearColor(self.clear_color));
    }

    fn clear(&mut self, mask: ClearMask) {
        if mask.contains(ClearMask::COLOR) {
            self.framebuffer = Framebuffer {
                color: self.clear_color,
                draws_since_clear: 0,
            };
        }
        self.calls.push(GlCall::Clear(mask));
    }
}
