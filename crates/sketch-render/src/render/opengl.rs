use std::fmt;

use crate::attrs::SketchAttrs;
use crate::coords::ColorRgba;
use crate::gl::{BufferTarget, ClearMask, DepthFunc, GlApi, Primitive, ShaderStage};
use crate::shape::{Geometry, Shape};

use super::cache::{BufferCache, CacheEntry};
use super::shader::{Shader, ShaderProgram, UniformKind};
use super::{RenderError, Renderer};

const VERTEX_SHADER: &str = include_str!("shaders/shape.vert");
const FRAGMENT_SHADER: &str = include_str!("shaders/shape.frag");

/// Single color slot; stroke reuses it.
const FILL_COLOR: &str = "fill_color";
const POSITION: &str = "position";

/// GLSL 1.30 needs desktop GL 3.0.
const MIN_VERSION: (u32, u32) = (3, 0);

/// Counters for the frame opened by the last `pre_render`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Shapes uploaded (cache misses).
    pub uploads: u32,
    pub triangle_draws: u32,
    pub line_loop_draws: u32,
    /// Indices submitted across all draws.
    pub elements: u64,
}

/// Shape renderer over an OpenGL-style API.
///
/// Each distinct shape is uploaded once into a vertex/index buffer pair and
/// redrawn from the cache on later frames. Positions are passed through to
/// clip space unchanged.
///
/// Fill draws indexed triangles; stroke draws the same index list as a line
/// loop, both colored through the `fill_color` uniform.
pub struct OpenGlRenderer<A: GlApi> {
    gl: A,
    program: ShaderProgram<A>,
    cache: BufferCache<A::Buffer>,

    vao: Option<A::VertexArray>,
    position_attr: Option<u32>,

    initialized: bool,
    stats: FrameStats,
}

impl<A: GlApi> OpenGlRenderer<A> {
    /// Wraps a context. No GL calls are made until `initialize`.
    pub fn new(gl: A) -> Self {
        Self {
            gl,
            program: ShaderProgram::new(),
            cache: BufferCache::new(),
            vao: None,
            position_attr: None,
            initialized: false,
            stats: FrameStats::default(),
        }
    }

    #[inline]
    pub fn gl(&self) -> &A {
        &self.gl
    }

    #[inline]
    pub fn gl_mut(&mut self) -> &mut A {
        &mut self.gl
    }

    #[inline]
    pub fn cache(&self) -> &BufferCache<A::Buffer> {
        &self.cache
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn init_shaders(&mut self) -> Result<(), RenderError> {
        let shaders = [
            Shader::new(VERTEX_SHADER, ShaderStage::Vertex),
            Shader::new(FRAGMENT_SHADER, ShaderStage::Fragment),
        ];

        for mut shader in shaders {
            shader.compile(&mut self.gl)?;
            shader.attach(&mut self.gl, &mut self.program)?;
        }

        self.program.link(&mut self.gl)?;
        self.program.activate(&mut self.gl)?;
        self.program.add_uniform(&mut self.gl, FILL_COLOR, UniformKind::Vec4)?;
        Ok(())
    }

    /// Shader program plus the vertex array shapes are drawn through.
    fn init_pipeline(&mut self) -> Result<(), RenderError> {
        self.init_shaders()?;

        let vao = self.gl.create_vertex_array().map_err(RenderError::Resource)?;
        self.gl.bind_vertex_array(Some(vao));
        self.vao = Some(vao);
        Ok(())
    }

    /// Drops the vertex array and program, including stages left attached by
    /// a failed link. Safe to call on a partially built pipeline.
    fn release_pipeline(&mut self) {
        if let Some(vao) = self.vao.take() {
            self.gl.bind_vertex_array(None);
            self.gl.delete_vertex_array(vao);
        }

        if self.program.pid().is_some() {
            self.gl.use_program(None);
            self.program.delete(&mut self.gl);
        }
        self.position_attr = None;
    }

    /// Returns the cached buffers for `shape`, uploading them on a miss.
    fn create_buffers(&mut self, shape: &dyn Geometry) -> Result<CacheEntry<A::Buffer>, RenderError> {
        let key = shape.fingerprint();
        if let Some(entry) = self.cache.get(key) {
            return Ok(entry);
        }

        let element_count = i32::try_from(shape.element_count())
            .map_err(|_| RenderError::Resource(format!("{} indices exceed i32", shape.element_count())))?;

        let vertex_buffer = self.gl.create_buffer().map_err(RenderError::Resource)?;
        let index_buffer = match self.gl.create_buffer() {
            Ok(b) => b,
            Err(e) => {
                self.gl.delete_buffer(vertex_buffer);
                return Err(RenderError::Resource(e));
            }
        };

        self.gl.bind_buffer(BufferTarget::Vertex, Some(vertex_buffer));
        self.gl
            .buffer_data(BufferTarget::Vertex, bytemuck::cast_slice(shape.vertices()));

        self.gl.bind_buffer(BufferTarget::Index, Some(index_buffer));
        self.gl
            .buffer_data(BufferTarget::Index, bytemuck::cast_slice(shape.faces()));

        let entry = CacheEntry {
            vertex_buffer,
            index_buffer,
            element_count,
        };
        self.cache.insert(key, entry);
        self.stats.uploads += 1;

        log::debug!(
            "uploaded shape {:016x}: {} vertices, {} indices ({} cached)",
            key.0,
            shape.vertices().len(),
            element_count,
            self.cache.len()
        );
        Ok(entry)
    }

    fn draw_buffers(&mut self, entry: CacheEntry<A::Buffer>, attrs: &SketchAttrs) -> Result<(), RenderError> {
        if attrs.draws_nothing() {
            return Ok(());
        }

        self.gl.bind_buffer(BufferTarget::Vertex, Some(entry.vertex_buffer));
        if let Some(attr) = self.position_attr {
            self.gl.enable_vertex_attrib(attr);
            self.gl.vertex_attrib_pointer_f32(attr, 3, 0, 0);
        }
        self.gl.bind_buffer(BufferTarget::Index, Some(entry.index_buffer));

        if attrs.fill_enabled {
            self.draw_with(Primitive::Triangles, attrs.fill_color, entry.element_count)?;
        }

        // TODO: stroke width once SketchAttrs carries one; line loops are 1px.
        if attrs.stroke_enabled {
            self.draw_with(Primitive::LineLoop, attrs.stroke_color, entry.element_count)?;
        }
        Ok(())
    }

    fn draw_with(&mut self, mode: Primitive, color: ColorRgba, count: i32) -> Result<(), RenderError> {
        self.program
            .set_uniform_data(&mut self.gl, FILL_COLOR, &color.normalized())?;
        self.gl.draw_elements(mode, count);

        match mode {
            Primitive::Triangles => self.stats.triangle_draws += 1,
            Primitive::LineLoop => self.stats.line_loop_draws += 1,
        }
        self.stats.elements += count as u64;
        Ok(())
    }
}

impl<A: GlApi> Renderer for OpenGlRenderer<A> {
    fn name(&self) -> &'static str {
        "OpenGlRenderer"
    }

    fn check_support(&self) -> Result<(), RenderError> {
        let version = self.gl.version();
        if version.is_embedded {
            return Err(RenderError::Unsupported {
                version,
                reason: "desktop OpenGL is required".to_string(),
            });
        }
        if !version.at_least(MIN_VERSION.0, MIN_VERSION.1) {
            return Err(RenderError::Unsupported {
                version,
                reason: format!("OpenGL {}.{} or newer is required", MIN_VERSION.0, MIN_VERSION.1),
            });
        }
        Ok(())
    }

    fn initialize(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError> {
        self.check_support()?;
        if self.initialized {
            log::debug!("{} already initialized", self.name());
            return Ok(());
        }

        self.gl.enable_depth_test(DepthFunc::LessEqual);
        let (width, height) = attrs.viewport.to_pixels();
        self.gl.set_viewport(0, 0, width, height);

        if let Err(e) = self.init_pipeline() {
            self.release_pipeline();
            return Err(e);
        }

        self.position_attr = self.program.attrib_location(&self.gl, POSITION);
        if self.position_attr.is_none() {
            log::warn!("'{POSITION}' attribute is not active; shapes will draw without vertices");
        }

        self.initialized = true;
        log::info!(
            "{} initialized (GL {}, viewport {}x{})",
            self.name(),
            self.gl.version(),
            width,
            height
        );
        Ok(())
    }

    fn pre_render(&mut self) -> Result<(), RenderError> {
        self.stats = FrameStats {
            frame: self.stats.frame + 1,
            ..FrameStats::default()
        };
        Ok(())
    }

    fn render(&mut self, shape: &dyn Geometry, attrs: &SketchAttrs) -> Result<(), RenderError> {
        if !self.initialized {
            return Err(RenderError::NotInitialized);
        }
        let entry = self.create_buffers(shape)?;
        self.draw_buffers(entry, attrs)
    }

    fn post_render(&mut self) -> Result<(), RenderError> {
        let s = self.stats;
        log::debug!(
            "frame {}: {} uploads, {} fill draws, {} stroke draws, {} elements, {} shapes cached",
            s.frame,
            s.uploads,
            s.triangle_draws,
            s.line_loop_draws,
            s.elements,
            self.cache.len()
        );
        Ok(())
    }

    fn clear(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError> {
        if !self.initialized {
            return Err(RenderError::NotInitialized);
        }
        let [r, g, b, a] = attrs.background_color.normalized();
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(ClearMask::COLOR | ClearMask::DEPTH);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), RenderError> {
        let released = self.cache.len();
        let entries: Vec<_> = self.cache.drain().collect();
        for entry in entries {
            self.gl.delete_buffer(entry.vertex_buffer);
            self.gl.delete_buffer(entry.index_buffer);
        }

        self.release_pipeline();

        if self.initialized {
            log::info!("{} cleaned up ({released} shapes released)", self.name());
        }
        self.initialized = false;
        Ok(())
    }

    /// Three rows of 32 rectangles with fill colors ramping across each row.
    fn test_render(&mut self, attrs: &SketchAttrs) -> Result<(), RenderError> {
        const LIM: i32 = 16;

        let mut attrs = *attrs;
        attrs.fill_enabled = true;

        for i in -LIM..LIM {
            let t = (i + LIM) as f32 / (LIM * 2) as f32;
            let x = i as f32 / 8.0;

            attrs.fill_color = ColorRgba::rgb(1.0 - t, 0.1, t);
            self.render(&Shape::rect(x, 0.95, 0.2, 0.6), &attrs)?;

            attrs.fill_color = ColorRgba::rgb(0.1, t, 1.0 - t);
            self.render(&Shape::rect(x, 0.3, 0.2, 0.6), &attrs)?;

            attrs.fill_color = ColorRgba::rgb(t, 1.0 - t, 0.1);
            self.render(&Shape::rect(x, -0.35, 0.2, 0.6), &attrs)?;
        }
        Ok(())
    }
}

impl<A: GlApi> fmt::Display for OpenGlRenderer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}( version: {} )", self.name(), self.gl.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, GlVersion, HeadlessGl};

    fn renderer() -> OpenGlRenderer<HeadlessGl> {
        let mut r = OpenGlRenderer::new(HeadlessGl::new());
        r.initialize(&SketchAttrs::default().with_size(640.0, 480.0))
            .unwrap();
        r.gl_mut().clear_calls();
        r
    }

    fn unit_square() -> Shape {
        Shape::rect(-0.5, 0.5, 1.0, 1.0)
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn initialize_sets_up_pipeline_state() {
        let mut r = OpenGlRenderer::new(HeadlessGl::new());
        r.initialize(&SketchAttrs::default().with_size(640.0, 480.0))
            .unwrap();

        let gl = r.gl();
        assert_eq!(gl.calls()[0], GlCall::EnableDepthTest(DepthFunc::LessEqual));
        assert_eq!(gl.viewport(), (0, 0, 640, 480));
        assert!(gl.current_program().is_some());
        assert!(r.is_initialized());
    }

    #[test]
    fn initialize_rejects_old_context() {
        let mut r = OpenGlRenderer::new(HeadlessGl::with_version(GlVersion::desktop(2, 1)));
        let err = r.initialize(&SketchAttrs::default()).unwrap_err();
        assert!(matches!(err, RenderError::Unsupported { .. }));
        assert!(r.gl().calls().is_empty());
    }

    #[test]
    fn initialize_rejects_embedded_context() {
        let gl = HeadlessGl::with_version(GlVersion {
            major: 3,
            minor: 0,
            is_embedded: true,
        });
        let r = OpenGlRenderer::new(gl);
        assert!(matches!(r.check_support(), Err(RenderError::Unsupported { .. })));
    }

    #[test]
    fn initialize_surfaces_link_failure() {
        let mut gl = HeadlessGl::new();
        gl.fail_next_link("driver says no");
        let mut r = OpenGlRenderer::new(gl);
        assert_eq!(
            r.initialize(&SketchAttrs::default()),
            Err(RenderError::ProgramLink {
                log: "driver says no".into()
            })
        );
        assert!(!r.is_initialized());
        assert_eq!(r.gl().live_programs(), 0);
    }

    #[test]
    fn initialize_retry_after_link_failure() {
        let mut gl = HeadlessGl::new();
        gl.fail_next_link("driver says no");
        let mut r = OpenGlRenderer::new(gl);
        assert!(r.initialize(&SketchAttrs::default()).is_err());
        r.initialize(&SketchAttrs::default()).unwrap();

        let gl = r.gl();
        let pid = gl.current_program().unwrap();
        let attached = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::AttachShader { program, .. } if *program == pid))
            .count();
        assert_eq!(attached, 2);
        assert_eq!(gl.live_programs(), 1);
        assert!(r.is_initialized());
    }

    #[test]
    fn release_drops_unlinked_program_and_stages() {
        let mut r = OpenGlRenderer::new(HeadlessGl::new());
        let mut stage = Shader::<HeadlessGl>::new(VERTEX_SHADER, ShaderStage::Vertex);
        stage.compile(&mut r.gl).unwrap();
        stage.attach(&mut r.gl, &mut r.program).unwrap();

        r.release_pipeline();

        assert!(r.program.pid().is_none());
        assert_eq!(r.gl().live_programs(), 0);
        assert!(r.gl().calls().iter().any(|c| matches!(c, GlCall::DeleteShader(_))));
    }

    #[test]
    fn render_before_initialize_fails() {
        let mut r = OpenGlRenderer::new(HeadlessGl::new());
        assert_eq!(
            r.render(&unit_square(), &SketchAttrs::default()),
            Err(RenderError::NotInitialized)
        );
    }

    // ── cache ─────────────────────────────────────────────────────────────

    #[test]
    fn same_shape_twice_reuses_buffers() {
        let mut r = renderer();
        let attrs = SketchAttrs::default();

        r.render(&unit_square(), &attrs).unwrap();
        let buffers = r.gl().live_buffers();
        r.render(&unit_square(), &attrs).unwrap();

        assert_eq!(r.cache().len(), 1);
        assert_eq!(r.gl().live_buffers(), buffers);
        let created = r
            .gl()
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::CreateBuffer(_)))
            .count();
        assert_eq!(created, 2);
    }

    #[test]
    fn distinct_shapes_get_own_entries() {
        let mut r = renderer();
        let attrs = SketchAttrs::default();
        r.render(&Shape::rect(0.0, 0.0, 0.5, 0.5), &attrs).unwrap();
        r.render(&Shape::rect(0.1, 0.0, 0.5, 0.5), &attrs).unwrap();
        assert_eq!(r.cache().len(), 2);
        assert_eq!(r.gl().live_buffers(), 4);
    }

    #[test]
    fn upload_contains_packed_vertex_and_index_data() {
        let mut r = renderer();
        let square = unit_square();
        r.render(&square, &SketchAttrs::default()).unwrap();

        let entry = r.cache().get(square.fingerprint()).unwrap();
        assert_eq!(entry.element_count, 6);
        assert_eq!(r.gl().buffer_contents(entry.vertex_buffer).unwrap().len(), 4 * 3 * 4);
        let indices: Vec<u32> = r
            .gl()
            .buffer_contents(entry.index_buffer)
            .unwrap()
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn shape_without_draws_is_still_cached() {
        let mut r = renderer();
        r.render(&unit_square(), &SketchAttrs::default().no_fill().no_stroke())
            .unwrap();
        assert_eq!(r.cache().len(), 1);
    }

    // ── draw calls ────────────────────────────────────────────────────────

    #[test]
    fn unit_square_fill_only_is_one_triangle_draw() {
        let mut r = renderer();
        r.render(&unit_square(), &SketchAttrs::default().no_stroke())
            .unwrap();

        assert_eq!(r.gl().draws(), vec![(Primitive::Triangles, 6)]);
        assert_eq!(r.gl().draw_count(Primitive::LineLoop), 0);
    }

    #[test]
    fn fill_and_stroke_use_their_own_colors() {
        let mut r = renderer();
        let fill = ColorRgba::rgb(1.0, 0.0, 0.0);
        let stroke = ColorRgba::rgb(0.0, 0.0, 1.0);
        r.render(&unit_square(), &SketchAttrs::default().fill(fill).stroke(stroke))
            .unwrap();

        let sequence: Vec<_> = r
            .gl()
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::Uniform { .. } | GlCall::DrawElements { .. }))
            .cloned()
            .collect();

        let GlCall::Uniform { location, .. } = sequence[0] else {
            panic!("expected uniform write, got {:?}", sequence[0]);
        };
        assert_eq!(
            sequence,
            vec![
                GlCall::Uniform { location, values: fill.normalized().to_vec() },
                GlCall::DrawElements { mode: Primitive::Triangles, count: 6 },
                GlCall::Uniform { location, values: stroke.normalized().to_vec() },
                GlCall::DrawElements { mode: Primitive::LineLoop, count: 6 },
            ]
        );
        assert_eq!(r.gl().uniform_value(location), Some(&stroke.normalized()[..]));
    }

    #[test]
    fn no_fill_no_stroke_issues_no_draws() {
        let mut r = renderer();
        r.render(&unit_square(), &SketchAttrs::default().no_fill().no_stroke())
            .unwrap();
        assert!(r.gl().draws().is_empty());
    }

    #[test]
    fn stroke_only_binds_index_buffer() {
        let mut r = renderer();
        let square = unit_square();
        r.render(&square, &SketchAttrs::default().no_fill()).unwrap();
        r.gl_mut().clear_calls();
        r.render(&square, &SketchAttrs::default().no_fill()).unwrap();

        let entry = r.cache().get(square.fingerprint()).unwrap();
        assert!(r.gl().calls().contains(&GlCall::BindBuffer {
            target: BufferTarget::Index,
            buffer: Some(entry.index_buffer),
        }));
        assert_eq!(r.gl().draws(), vec![(Primitive::LineLoop, 6)]);
    }

    #[test]
    fn empty_face_list_draws_zero_elements() {
        let mut r = renderer();
        let points = Shape::new(vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.0]], vec![]);
        r.render(&points, &SketchAttrs::default().no_stroke()).unwrap();
        assert_eq!(r.gl().draws(), vec![(Primitive::Triangles, 0)]);
    }

    #[test]
    fn vertex_layout_is_three_packed_floats() {
        let mut r = renderer();
        r.render(&unit_square(), &SketchAttrs::default()).unwrap();
        assert!(r.gl().calls().contains(&GlCall::VertexAttribPointer {
            index: 0,
            size: 3,
            stride: 0,
            offset: 0,
        }));
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_leaves_background_color() {
        let mut r = renderer();
        let bg = ColorRgba::rgb(0.2, 0.4, 0.6);
        r.clear(&SketchAttrs::default().background(bg)).unwrap();

        let fb = r.gl().framebuffer();
        assert_eq!(fb.color, bg.normalized());
        assert_eq!(fb.draws_since_clear, 0);
        assert!(r
            .gl()
            .calls()
            .contains(&GlCall::Clear(ClearMask::COLOR | ClearMask::DEPTH)));
    }

    // ── frame hooks / stats ───────────────────────────────────────────────

    #[test]
    fn stats_reset_each_frame() {
        let mut r = renderer();
        let attrs = SketchAttrs::default();

        r.pre_render().unwrap();
        r.render(&unit_square(), &attrs).unwrap();
        r.post_render().unwrap();
        assert_eq!(
            r.stats(),
            FrameStats {
                frame: 1,
                uploads: 1,
                triangle_draws: 1,
                line_loop_draws: 1,
                elements: 12,
            }
        );

        r.pre_render().unwrap();
        r.render(&unit_square(), &attrs.no_stroke()).unwrap();
        assert_eq!(r.stats().frame, 2);
        assert_eq!(r.stats().uploads, 0);
        assert_eq!(r.stats().triangle_draws, 1);
    }

    #[test]
    fn test_render_draws_three_rows() {
        let mut r = renderer();
        r.test_render(&SketchAttrs::default().no_stroke()).unwrap();
        assert_eq!(r.gl().draw_count(Primitive::Triangles), 96);
        assert_eq!(r.cache().len(), 96);
    }

    // ── cleanup ───────────────────────────────────────────────────────────

    #[test]
    fn cleanup_releases_everything() {
        let mut r = renderer();
        r.render(&unit_square(), &SketchAttrs::default()).unwrap();
        r.cleanup().unwrap();

        assert!(r.cache().is_empty());
        assert_eq!(r.gl().live_buffers(), 0);
        assert_eq!(r.gl().live_programs(), 0);
        assert!(!r.is_initialized());
        assert_eq!(
            r.render(&unit_square(), &SketchAttrs::default()),
            Err(RenderError::NotInitialized)
        );
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut r = renderer();
        r.cleanup().unwrap();
        r.gl_mut().clear_calls();
        r.cleanup().unwrap();
        assert!(r.gl().calls().is_empty());
    }

    #[test]
    fn reinitialize_after_cleanup() {
        let mut r = renderer();
        r.cleanup().unwrap();
        r.initialize(&SketchAttrs::default()).unwrap();
        r.render(&unit_square(), &SketchAttrs::default()).unwrap();
        assert_eq!(r.cache().len(), 1);
    }

    #[test]
    fn display_reports_version() {
        let r = OpenGlRenderer::new(HeadlessGl::new());
        assert_eq!(r.to_string(), "OpenGlRenderer( version: 3.3 )");
    }
}
