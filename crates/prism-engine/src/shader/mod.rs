//! Shader programs: loading, validation, reflection and hot reload.
//!
//! Programs are WGSL modules. Reflection reads the vertex entry point's
//! `@location` inputs so geometry can be matched against any program at
//! runtime.

mod program;
mod reflect;
mod registry;
mod source;

pub use program::{CompiledProgram, Program, ProgramDesc, ProgramHandle, ProgramId};
pub use reflect::{capabilities_for, compile, reflect_inputs};
pub use registry::{ProgramRegistry, Reload};
pub use source::{FsReader, SourceFile, SourceReader};

/// A ready program with a fixed handle and inputs, for cache tests.
#[cfg(test)]
pub(crate) fn test_program(handle: u64, inputs: crate::geometry::ShaderInputLayout) -> Program {
    Program {
        desc: ProgramDesc::new(format!("test{handle}"), "test.wgsl"),
        handle: ProgramHandle(handle),
        last_write: std::time::SystemTime::UNIX_EPOCH,
        inputs,
        reflected: true,
        compiled: Some(CompiledProgram { source: std::sync::Arc::from("") }),
    }
}
