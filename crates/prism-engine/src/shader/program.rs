use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::geometry::ShaderInputLayout;

/// Identity of one successful or failed compile.
///
/// Every (re)compile allocates a fresh handle, so caches keyed by handle never
/// serve objects built from an older version of the source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub(crate) u64);

impl ProgramHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Stable registry slot. Survives reloads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) usize);

/// Where a program comes from and which entry points it uses.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProgramDesc {
    /// Logical name used in logs and errors.
    pub name: String,
    pub path: PathBuf,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl ProgramDesc {
    /// Description with the default `vs_main` / `fs_main` entry points.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            vertex_entry: "vs_main".to_owned(),
            fragment_entry: "fs_main".to_owned(),
        }
    }

    /// Selects other entry points, e.g. for several programs sharing one file.
    pub fn with_entries(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }
}

/// Validated WGSL ready to hand to the device.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub source: Arc<str>,
}

/// A registry entry.
#[derive(Debug)]
pub struct Program {
    pub(crate) desc: ProgramDesc,
    pub(crate) handle: ProgramHandle,
    pub(crate) last_write: SystemTime,
    pub(crate) inputs: ShaderInputLayout,
    pub(crate) reflected: bool,
    pub(crate) compiled: Option<CompiledProgram>,
}

impl Program {
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    pub fn last_write(&self) -> SystemTime {
        self.last_write
    }

    /// Vertex inputs reflected from the vertex entry point.
    pub fn inputs(&self) -> &ShaderInputLayout {
        &self.inputs
    }

    /// `None` when the last compile of the current handle failed.
    pub fn compiled(&self) -> Option<&CompiledProgram> {
        self.compiled.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.compiled.is_some()
    }
}
