//! Engine error taxonomy.

use std::path::PathBuf;

/// Errors produced by the rendering core.
///
/// Shader failures are reported but non-fatal: the registry keeps the slot and
/// rendering continues with whatever handle is current. `MissingAttribute`
/// skips a single draw. `FramebufferIncomplete` is surfaced at setup so that
/// initialization can fail explicitly.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// WGSL failed to parse.
    #[error("failed to compile program `{program}`:\n{log}")]
    ShaderCompile { program: String, log: String },

    /// The module parsed but did not validate, or lacks a required entry point.
    #[error("failed to link program `{program}`:\n{log}")]
    ShaderLink { program: String, log: String },

    /// A submesh does not provide an attribute the program reads.
    #[error("program `{program}` reads vertex location {location} which the submesh does not provide")]
    MissingAttribute { program: String, location: u32 },

    #[error("failed to load texture {path}: {reason}")]
    TextureLoad { path: PathBuf, reason: String },

    #[error("offscreen target is incomplete: {0}")]
    FramebufferIncomplete(String),

    #[error("uniform buffer overflow: write ends at {requested} bytes, capacity is {capacity}")]
    UniformOverflow { requested: u64, capacity: u64 },

    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(u64),

    #[error("vertex location {0} declared twice in one layout")]
    DuplicateLocation(u32),

    #[error("vertex attribute with {0} components (expected 1..=4)")]
    InvalidComponentCount(u8),

    #[error("failed to import model {path}: {reason}")]
    ModelImport { path: PathBuf, reason: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Returns `true` for shader errors that leave the program slot usable.
    pub fn is_shader_error(&self) -> bool {
        matches!(self, Self::ShaderCompile { .. } | Self::ShaderLink { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_program_and_location() {
        let err = RenderError::MissingAttribute { program: "mesh".into(), location: 2 };
        let msg = err.to_string();
        assert!(msg.contains("`mesh`"));
        assert!(msg.contains("location 2"));
    }

    #[test]
    fn shader_errors_are_classified() {
        let compile = RenderError::ShaderCompile { program: "a".into(), log: String::new() };
        let link = RenderError::ShaderLink { program: "a".into(), log: String::new() };
        assert!(compile.is_shader_error());
        assert!(link.is_shader_error());
        assert!(!RenderError::InvalidAlignment(3).is_shader_error());
    }

    #[test]
    fn overflow_reports_both_sizes() {
        let err = RenderError::UniformOverflow { requested: 300, capacity: 256 };
        assert_eq!(
            err.to_string(),
            "uniform buffer overflow: write ends at 300 bytes, capacity is 256"
        );
    }
}
