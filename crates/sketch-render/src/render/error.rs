//! Error type shared by all renderers.

use std::fmt;

use crate::gl::{GlVersion, ShaderStage};

/// Failure raised by a renderer or its shader program.
///
/// None of these are retried; a renderer that returns one from `initialize`
/// is unusable.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The context cannot run this renderer.
    Unsupported {
        /// Version reported by the context.
        version: GlVersion,
        /// What was required instead.
        reason: String,
    },
    /// A shader stage failed to compile.
    ShaderCompile {
        stage: ShaderStage,
        /// Compiler info log.
        log: String,
    },
    /// The program failed to link, or was used before linking.
    ProgramLink {
        /// Linker info log.
        log: String,
    },
    /// `set_uniform_data` was called for a name never passed to `add_uniform`.
    UnknownUniform { name: String },
    /// Value count does not match the uniform's registered kind.
    UniformArity {
        name: String,
        expected: usize,
        got: usize,
    },
    /// The context refused to create an object.
    Resource(String),
    /// A draw or clear was issued before `initialize`.
    NotInitialized,
    /// The backend does not implement this capability.
    Unimplemented(&'static str),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Unsupported { version, reason } => {
                write!(f, "renderer not supported on GL {version}: {reason}")
            }
            RenderError::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            RenderError::ProgramLink { log } => write!(f, "shader program failed to link: {log}"),
            RenderError::UnknownUniform { name } => write!(f, "uniform '{name}' is not registered"),
            RenderError::UniformArity { name, expected, got } => write!(
                f,
                "uniform '{name}' takes {expected} value(s), got {got}"
            ),
            RenderError::Resource(msg) => write!(f, "failed to create GL object: {msg}"),
            RenderError::NotInitialized => f.write_str("renderer used before initialize()"),
            RenderError::Unimplemented(what) => write!(f, "renderer does not implement {what}"),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_version_and_reason() {
        let e = RenderError::Unsupported {
            version: GlVersion::desktop(2, 1),
            reason: "needs GL 3.0".into(),
        };
        assert_eq!(e.to_string(), "renderer not supported on GL 2.1: needs GL 3.0");
    }

    #[test]
    fn display_compile_names_stage() {
        let e = RenderError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "syntax error".into(),
        };
        assert!(e.to_string().starts_with("fragment shader"));
    }
}
