use std::sync::Arc;

use naga::valid::Capabilities;

use crate::error::RenderError;

use super::program::{CompiledProgram, Program, ProgramDesc, ProgramHandle, ProgramId};
use super::reflect;
use super::source::SourceReader;

/// A program whose source changed and was recompiled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Reload {
    pub id: ProgramId,
    pub old: ProgramHandle,
    pub new: ProgramHandle,
    /// `false` when the new source failed to compile; the new handle is broken.
    pub ok: bool,
}

/// Owns every loaded program and watches their sources for changes.
#[derive(Debug)]
pub struct ProgramRegistry {
    programs: Vec<Program>,
    next_handle: u64,
    reflect_on_reload: bool,
    capabilities: Capabilities,
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self {
            programs: Vec::new(),
            next_handle: 1,
            reflect_on_reload: false,
            capabilities: Capabilities::empty(),
        }
    }

    /// Re-reflect vertex inputs on every successful reload instead of only once.
    pub fn set_reflect_on_reload(&mut self, enabled: bool) {
        self.reflect_on_reload = enabled;
    }

    pub fn reflect_on_reload(&self) -> bool {
        self.reflect_on_reload
    }

    /// Shader capabilities programs are validated against; none by default.
    ///
    /// Takes effect for programs loaded or reloaded afterwards.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Reads and compiles a program, returning its slot.
    ///
    /// Only an unreadable source is an error here. A compile failure is logged
    /// and the slot is kept with a broken handle so a later edit can fix it.
    pub fn load(
        &mut self,
        desc: ProgramDesc,
        reader: &dyn SourceReader,
    ) -> Result<ProgramId, RenderError> {
        let file = reader.read(&desc.path).map_err(|source| RenderError::Io {
            path: desc.path.clone(),
            source,
        })?;

        let handle = self.allocate();
        let mut program = Program {
            desc,
            handle,
            last_write: file.last_write,
            inputs: Default::default(),
            reflected: false,
            compiled: None,
        };
        install(&mut program, &file.text, true, self.capabilities);

        let id = ProgramId(self.programs.len());
        log::info!(
            "loaded program `{}` from {} ({:?})",
            program.desc.name,
            program.desc.path.display(),
            handle
        );
        self.programs.push(program);
        Ok(id)
    }

    /// Recompiles every program whose source is newer than the copy last compiled.
    ///
    /// Each changed program gets exactly one new handle, whether or not the new
    /// source compiles. Failed compiles are not rolled back.
    pub fn hot_reload(&mut self, reader: &dyn SourceReader) -> Vec<Reload> {
        let mut reloads = Vec::new();

        for index in 0..self.programs.len() {
            let path = self.programs[index].desc.path.clone();
            let stamp = match reader.last_write(&path) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("cannot stat shader {}: {e}", path.display());
                    continue;
                }
            };
            if stamp <= self.programs[index].last_write {
                continue;
            }

            let file = match reader.read(&path) {
                Ok(f) => f,
                Err(e) => {
                    log::warn!("cannot read shader {}: {e}", path.display());
                    continue;
                }
            };

            let new = self.allocate();
            let reflect = self.reflect_on_reload;
            let capabilities = self.capabilities;
            let program = &mut self.programs[index];
            let old = program.handle;

            program.handle = new;
            program.last_write = file.last_write.max(stamp);
            let ok = install(program, &file.text, reflect, capabilities);

            log::info!(
                "reloaded program `{}`: {:?} -> {:?}{}",
                program.desc.name,
                old,
                new,
                if ok { "" } else { " (broken)" }
            );
            reloads.push(Reload { id: ProgramId(index), old, new, ok });
        }

        reloads
    }

    pub fn get(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(id.0)
    }

    /// Slot of the first program with the given logical name.
    pub fn find(&self, name: &str) -> Option<ProgramId> {
        self.programs.iter().position(|p| p.desc.name == name).map(ProgramId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramId, &Program)> {
        self.programs.iter().enumerate().map(|(i, p)| (ProgramId(i), p))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    fn allocate(&mut self) -> ProgramHandle {
        let handle = ProgramHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

/// Compiles `text` into `program`. Returns whether the program is usable.
///
/// Inputs are reflected on the first successful compile, and again afterwards
/// only when `reflect` is set.
fn install(program: &mut Program, text: &str, reflect: bool, capabilities: Capabilities) -> bool {
    let result = reflect::compile(&program.desc, text, capabilities).and_then(|module| {
        if reflect || !program.reflected {
            reflect::reflect_inputs(&module, &program.desc).map(Some)
        } else {
            Ok(None)
        }
    });

    match result {
        Ok(inputs) => {
            if let Some(inputs) = inputs {
                program.inputs = inputs;
                program.reflected = true;
            }
            program.compiled = Some(CompiledProgram { source: Arc::from(text) });
            true
        }
        Err(e) => {
            log::error!("{e}");
            program.compiled = None;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::source::memory::MemoryReader;

    fn shader(locs: &str) -> String {
        format!(
            r#"
@vertex
fn vs_main({locs}) -> @builtin(position) vec4<f32> {{
    return vec4<f32>(0.0);
}}

@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return vec4<f32>(1.0);
}}
"#
        )
    }

    fn input_locations(p: &Program) -> Vec<u32> {
        p.inputs().attributes().iter().map(|a| a.location).collect()
    }

    fn setup() -> (ProgramRegistry, MemoryReader, ProgramId) {
        let reader = MemoryReader::default();
        reader.write("a.wgsl", &shader("@location(0) p: vec3<f32>"));
        let mut reg = ProgramRegistry::new();
        let id = reg.load(ProgramDesc::new("a", "a.wgsl"), &reader).unwrap();
        (reg, reader, id)
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn load_reflects_inputs() {
        let (reg, _, id) = setup();
        let p = reg.get(id).unwrap();
        assert!(p.is_ready());
        assert_eq!(input_locations(p), vec![0]);
        assert_eq!(reg.find("a"), Some(id));
    }

    #[test]
    fn missing_source_is_io_error() {
        let reader = MemoryReader::default();
        let mut reg = ProgramRegistry::new();
        let err = reg.load(ProgramDesc::new("x", "x.wgsl"), &reader).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn broken_source_keeps_slot() {
        let reader = MemoryReader::default();
        reader.write("b.wgsl", "not wgsl");
        let mut reg = ProgramRegistry::new();
        let id = reg.load(ProgramDesc::new("b", "b.wgsl"), &reader).unwrap();
        assert!(!reg.get(id).unwrap().is_ready());
    }

    // ── hot reload ────────────────────────────────────────────────────────

    #[test]
    fn unchanged_source_is_not_recompiled() {
        let (mut reg, reader, id) = setup();
        let before = reg.get(id).unwrap().handle();
        assert!(reg.hot_reload(&reader).is_empty());
        assert!(reg.hot_reload(&reader).is_empty());
        assert_eq!(reg.get(id).unwrap().handle(), before);
    }

    #[test]
    fn newer_source_gets_exactly_one_new_handle() {
        let (mut reg, reader, id) = setup();
        let old = reg.get(id).unwrap().handle();

        reader.write("a.wgsl", &shader("@location(0) p: vec4<f32>"));
        let reloads = reg.hot_reload(&reader);
        assert_eq!(reloads.len(), 1);
        assert_eq!(reloads[0].old, old);
        assert_ne!(reloads[0].new, old);
        assert!(reloads[0].ok);
        assert_eq!(reg.get(id).unwrap().handle(), reloads[0].new);

        // Same timestamp on the next tick: nothing to do.
        assert!(reg.hot_reload(&reader).is_empty());
    }

    #[test]
    fn failed_reload_is_not_rolled_back() {
        let (mut reg, reader, id) = setup();
        reader.write("a.wgsl", "fn oops(");
        let reloads = reg.hot_reload(&reader);
        assert_eq!(reloads.len(), 1);
        assert!(!reloads[0].ok);

        let p = reg.get(id).unwrap();
        assert_eq!(p.handle(), reloads[0].new);
        assert!(!p.is_ready());
    }

    #[test]
    fn reload_with_integer_input_is_broken() {
        let (mut reg, reader, id) = setup();
        reader.write("a.wgsl", &shader("@location(0) p: vec3<u32>"));
        let reloads = reg.hot_reload(&reader);
        assert_eq!(reloads.len(), 1);
        assert!(!reloads[0].ok);
        assert!(!reg.get(id).unwrap().is_ready());
    }

    #[test]
    fn inputs_are_reflected_once_by_default() {
        let (mut reg, reader, id) = setup();
        reader.write("a.wgsl", &shader("@location(4) p: vec3<f32>"));
        reg.hot_reload(&reader);
        assert_eq!(input_locations(reg.get(id).unwrap()), vec![0]);
    }

    #[test]
    fn reflect_on_reload_picks_up_new_inputs() {
        let (mut reg, reader, id) = setup();
        reg.set_reflect_on_reload(true);
        reader.write("a.wgsl", &shader("@location(4) p: vec3<f32>"));
        reg.hot_reload(&reader);
        assert_eq!(input_locations(reg.get(id).unwrap()), vec![4]);
    }

    #[test]
    fn broken_first_compile_reflects_after_fix() {
        let reader = MemoryReader::default();
        reader.write("c.wgsl", "broken");
        let mut reg = ProgramRegistry::new();
        let id = reg.load(ProgramDesc::new("c", "c.wgsl"), &reader).unwrap();

        reader.write("c.wgsl", &shader("@location(2) uv: vec2<f32>"));
        reg.hot_reload(&reader);
        let p = reg.get(id).unwrap();
        assert!(p.is_ready());
        assert_eq!(input_locations(p), vec![2]);
    }

    #[test]
    fn handles_are_unique_across_programs() {
        let (mut reg, reader, a) = setup();
        reader.write("d.wgsl", &shader(""));
        let d = reg.load(ProgramDesc::new("d", "d.wgsl"), &reader).unwrap();
        assert_ne!(reg.get(a).unwrap().handle(), reg.get(d).unwrap().handle());
    }
}
