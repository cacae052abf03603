//! Shader stages and linked programs with a named-uniform interface.

use std::collections::HashMap;

use crate::gl::{GlApi, ShaderStage};

use super::RenderError;

/// Shape of a uniform value; selects the upload call and the value count.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl UniformKind {
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            UniformKind::Float => 1,
            UniformKind::Vec2 => 2,
            UniformKind::Vec3 => 3,
            UniformKind::Vec4 => 4,
        }
    }

    /// Writes `values` to `location`, or only checks the count when the
    /// uniform is inactive.
    fn upload<A: GlApi>(
        self,
        gl: &mut A,
        name: &str,
        location: Option<&A::UniformLocation>,
        values: &[f32],
    ) -> Result<(), RenderError> {
        match (self, values, location) {
            (UniformKind::Float, &[x], Some(loc)) => gl.uniform_1f(loc, x),
            (UniformKind::Vec2, &[x, y], Some(loc)) => gl.uniform_2f(loc, x, y),
            (UniformKind::Vec3, &[x, y, z], Some(loc)) => gl.uniform_3f(loc, x, y, z),
            (UniformKind::Vec4, &[x, y, z, w], Some(loc)) => gl.uniform_4f(loc, x, y, z, w),
            (kind, values, _) if values.len() != kind.arity() => {
                return Err(RenderError::UniformArity {
                    name: name.to_string(),
                    expected: kind.arity(),
                    got: values.len(),
                });
            }
            (_, _, None) => {}
            (kind, values, Some(_)) => unreachable!("{kind:?} matched {} values", values.len()),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Uniform<A: GlApi> {
    kind: UniformKind,
    /// `None` when the linker dropped the uniform; writes become no-ops.
    location: Option<A::UniformLocation>,
}

/// One shader stage: source text plus, once compiled, its GL object.
#[derive(Debug)]
pub struct Shader<A: GlApi> {
    source: String,
    stage: ShaderStage,
    handle: Option<A::Shader>,
}

impl<A: GlApi> Shader<A> {
    pub fn new(source: impl Into<String>, stage: ShaderStage) -> Self {
        Self {
            source: source.into(),
            stage,
            handle: None,
        }
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.handle.is_some()
    }

    pub fn compile(&mut self, gl: &mut A) -> Result<(), RenderError> {
        if self.handle.is_some() {
            return Ok(());
        }

        let shader = gl.create_shader(self.stage).map_err(RenderError::Resource)?;
        if let Err(log) = gl.compile_shader(shader, &self.source) {
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile {
                stage: self.stage,
                log,
            });
        }

        self.handle = Some(shader);
        Ok(())
    }

    /// Attaches the compiled stage to `program`, creating the program object
    /// on first use.
    pub fn attach(&self, gl: &mut A, program: &mut ShaderProgram<A>) -> Result<(), RenderError> {
        let Some(shader) = self.handle else {
            return Err(RenderError::ShaderCompile {
                stage: self.stage,
                log: "attached before compile".to_string(),
            });
        };
        let pid = program.ensure_created(gl)?;
        gl.attach_shader(pid, shader);
        program.attached.push(shader);
        Ok(())
    }
}

/// A linked GL program and the uniforms registered on it.
#[derive(Debug)]
pub struct ShaderProgram<A: GlApi> {
    handle: Option<A::Program>,
    attached: Vec<A::Shader>,
    linked: bool,
    uniforms: HashMap<String, Uniform<A>>,
}

impl<A: GlApi> Default for ShaderProgram<A> {
    fn default() -> Self {
        Self {
            handle: None,
            attached: Vec::new(),
            linked: false,
            uniforms: HashMap::new(),
        }
    }
}

impl<A: GlApi> ShaderProgram<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// GL program object, once a shader has been attached.
    #[inline]
    pub fn pid(&self) -> Option<A::Program> {
        self.handle
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    fn ensure_created(&mut self, gl: &mut A) -> Result<A::Program, RenderError> {
        if let Some(pid) = self.handle {
            return Ok(pid);
        }
        let pid = gl.create_program().map_err(RenderError::Resource)?;
        self.handle = Some(pid);
        Ok(pid)
    }

    fn linked_pid(&self) -> Result<A::Program, RenderError> {
        match self.handle {
            Some(pid) if self.linked => Ok(pid),
            _ => Err(RenderError::ProgramLink {
                log: "program is not linked".to_string(),
            }),
        }
    }

    /// Links the attached stages. Stage objects are released once linked.
    pub fn link(&mut self, gl: &mut A) -> Result<(), RenderError> {
        let Some(pid) = self.handle else {
            return Err(RenderError::ProgramLink {
                log: "no shaders attached".to_string(),
            });
        };

        gl.link_program(pid)
            .map_err(|log| RenderError::ProgramLink { log })?;

        for shader in self.attached.drain(..) {
            gl.delete_shader(shader);
        }
        self.linked = true;
        Ok(())
    }

    /// Binds the program for subsequent draws.
    pub fn activate(&self, gl: &mut A) -> Result<(), RenderError> {
        let pid = self.linked_pid()?;
        gl.use_program(Some(pid));
        Ok(())
    }

    /// Registers `name` as a settable uniform of shape `kind`.
    pub fn add_uniform(&mut self, gl: &mut A, name: &str, kind: UniformKind) -> Result<(), RenderError> {
        let pid = self.linked_pid()?;
        let location = gl.uniform_location(pid, name);
        if location.is_none() {
            log::warn!("uniform '{name}' is not active in the linked program; writes will be ignored");
        }
        self.uniforms.insert(name.to_string(), Uniform { kind, location });
        Ok(())
    }

    /// Pushes `values` into a registered uniform.
    pub fn set_uniform_data(&self, gl: &mut A, name: &str, values: &[f32]) -> Result<(), RenderError> {
        let Some(uniform) = self.uniforms.get(name) else {
            return Err(RenderError::UnknownUniform {
                name: name.to_string(),
            });
        };
        uniform
            .kind
            .upload(gl, name, uniform.location.as_ref(), values)
    }

    pub fn attrib_location(&self, gl: &A, name: &str) -> Option<u32> {
        let pid = self.linked_pid().ok()?;
        gl.attrib_location(pid, name)
    }

    /// Releases the program and any still-attached stages.
    pub fn delete(&mut self, gl: &mut A) {
        for shader in self.attached.drain(..) {
            gl.delete_shader(shader);
        }
        if let Some(pid) = self.handle.take() {
            gl.delete_program(pid);
        }
        self.linked = false;
        self.uniforms.clear();
    }
}
