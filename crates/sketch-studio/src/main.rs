//! Headless sketch driver.
//!
//! Runs the renderer's built-in test pattern for a number of frames against
//! `HeadlessGl` and reports what reached the GL layer. Usage:
//!
//! ```text
//! sketch-studio [FRAMES]
//! ```
//!
//! Set `SKETCH_FRAME_STATS` to log per-frame upload and draw counts.

use anyhow::{Context, Result};
use sketch_render::coords::ColorRgba;
use sketch_render::gl::{HeadlessGl, Primitive};
use sketch_render::logging::{init_logging, LoggingConfig};
use sketch_render::{OpenGlRenderer, Renderer, Shape, SketchAttrs};

const DEFAULT_FRAMES: u64 = 3;

fn main() -> Result<()> {
    let frame_stats = std::env::var_os("SKETCH_FRAME_STATS").is_some();
    init_logging(LoggingConfig::default().with_frame_stats(frame_stats));

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("invalid frame count '{arg}'"))?,
        None => DEFAULT_FRAMES,
    };

    let attrs = SketchAttrs::new()
        .with_size(640.0, 360.0)
        .background(ColorRgba::from_rgba8(24, 24, 32, 255))
        .stroke(ColorRgba::white());

    let mut renderer = OpenGlRenderer::new(HeadlessGl::new());
    renderer
        .initialize(&attrs)
        .context("failed to initialize renderer")?;
    log::info!("{renderer}");

    // Outline drawn on top of the pattern every frame; uploaded once.
    let frame_outline = Shape::rect(-0.98, 0.98, 1.96, 1.96);

    for _ in 0..frames {
        renderer.pre_render()?;
        renderer.clear(&attrs).context("clear failed")?;
        renderer
            .test_render(&attrs.no_stroke())
            .context("test pattern failed")?;
        renderer
            .render(&frame_outline, &attrs.no_fill())
            .context("outline failed")?;
        renderer.post_render()?;

        let stats = renderer.stats();
        log::info!(
            "frame {}: {} uploads, {} fill + {} stroke draws",
            stats.frame,
            stats.uploads,
            stats.triangle_draws,
            stats.line_loop_draws
        );
    }

    let gl = renderer.gl();
    log::info!(
        "{} frames, {} triangle draws, {} line loops, {} live buffers",
        frames,
        gl.draw_count(Primitive::Triangles),
        gl.draw_count(Primitive::LineLoop),
        gl.live_buffers()
    );

    renderer.cleanup().context("cleanup failed")?;
    Ok(())
}
