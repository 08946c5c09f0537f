//! Prism sandbox: a small animated scene for exercising the engine's draw
//! paths, shader hot reload and camera controls.
//!
//! Keys: `0` textured quad, `1` meshes, `2` offscreen pass, `F1` info dump,
//! `Esc` quit. Drag with the left button to pan the camera. Edit the WGSL
//! files under `assets/shaders` while running to reload them.

mod app;
mod demo;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::render::RenderMode;
use prism_engine::window::{Runtime, RuntimeConfig};
use prism_engine::EngineConfig;

#[derive(Debug, Parser)]
#[command(name = "prism-sandbox", version, about = "Real-time rendering sandbox")]
struct Args {
    /// OBJ model for the animated entities. A textured cube is used when omitted.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory holding `shaders/` and `textures/`.
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))]
    assets: PathBuf,

    /// Render mode at startup.
    #[arg(long, value_enum, default_value_t = ModeArg::Offscreen)]
    mode: ModeArg,

    /// Log filter in env_logger syntax, e.g. `debug` or `prism_engine=trace`.
    #[arg(long)]
    log: Option<String>,

    /// Re-reflect vertex inputs whenever a shader is reloaded.
    #[arg(long)]
    reflect_on_reload: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Quad,
    Meshes,
    Offscreen,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Quad => RenderMode::TexturedQuad,
            ModeArg::Meshes => RenderMode::Meshes,
            ModeArg::Offscreen => RenderMode::FrameBufferPass,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let engine_config = EngineConfig {
        asset_root: args.assets.clone(),
        initial_mode: args.mode.into(),
        reflect_on_reload: args.reflect_on_reload,
        ..Default::default()
    };
    log::info!("assets: {}", engine_config.asset_root.display());

    let runtime = RuntimeConfig {
        title: app::TITLE.to_string(),
        initial_size: LogicalSize::new(f64::from(args.width), f64::from(args.height)),
        ..Default::default()
    };

    Runtime::run(runtime, app::SandboxApp::new(engine_config, args.model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_offscreen() {
        let args = Args::parse_from(["prism-sandbox"]);
        assert_eq!(RenderMode::from(args.mode), RenderMode::FrameBufferPass);
        assert!(args.model.is_none());
        assert!(args.assets.ends_with("assets"));
    }

    #[test]
    fn mode_and_model_flags() {
        let args = Args::parse_from(["prism-sandbox", "--mode", "quad", "--model", "m/patrick.obj"]);
        assert_eq!(RenderMode::from(args.mode), RenderMode::TexturedQuad);
        assert_eq!(args.model, Some(PathBuf::from("m/patrick.obj")));
    }
}
