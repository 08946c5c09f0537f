//! Engine configuration.

use std::path::{Path, PathBuf};

use crate::render::RenderMode;
use crate::scene::Camera;
use crate::shader::ProgramDesc;

/// Startup options for [`Engine`](crate::Engine).
///
/// Relative paths (program sources, quad texture) are resolved against
/// `asset_root`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub asset_root: PathBuf,
    /// Program for the textured quad and the offscreen composite.
    pub quad_program: ProgramDesc,
    /// Program for entities.
    pub mesh_program: ProgramDesc,
    pub quad_texture: PathBuf,
    pub initial_mode: RenderMode,
    /// Re-reflect vertex inputs on every reload instead of only the first compile.
    pub reflect_on_reload: bool,
    pub clear_color: wgpu::Color,
    pub camera: Camera,
    /// Upper bound for the frame uniform buffer in bytes. `None` uses the
    /// device's maximum uniform binding size.
    pub uniform_capacity: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            quad_program: ProgramDesc::new("textured_geometry", "shaders/textured_geometry.wgsl"),
            mesh_program: ProgramDesc::new("textured_mesh", "shaders/textured_mesh.wgsl"),
            quad_texture: PathBuf::from("textures/checker.bmp"),
            initial_mode: RenderMode::default(),
            reflect_on_reload: false,
            clear_color: wgpu::Color { r: 0.1, g: 0.1, b: 0.12, a: 1.0 },
            camera: Camera::default(),
            uniform_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Joins `path` onto `asset_root` unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }

    /// Buffer size to allocate given the device's binding limit.
    pub fn uniform_capacity_for(&self, max_binding_size: u64) -> u64 {
        match self.uniform_capacity {
            Some(cap) => cap.min(max_binding_size),
            None => max_binding_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_under_asset_root() {
        let cfg = EngineConfig { asset_root: PathBuf::from("/data"), ..Default::default() };
        assert_eq!(
            cfg.resolve(&cfg.mesh_program.path),
            PathBuf::from("/data/shaders/textured_mesh.wgsl")
        );
        assert_eq!(cfg.resolve(Path::new("/abs/x.png")), PathBuf::from("/abs/x.png"));
    }

    #[test]
    fn uniform_capacity_never_exceeds_device_limit() {
        let mut cfg = EngineConfig::default();
        assert_eq!(cfg.uniform_capacity_for(65536), 65536);
        cfg.uniform_capacity = Some(1 << 20);
        assert_eq!(cfg.uniform_capacity_for(65536), 65536);
        cfg.uniform_capacity = Some(4096);
        assert_eq!(cfg.uniform_capacity_for(65536), 4096);
    }

    #[test]
    fn defaults_start_in_offscreen_mode() {
        assert_eq!(EngineConfig::default().initial_mode, RenderMode::FrameBufferPass);
    }
}
