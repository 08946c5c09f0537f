use std::path::PathBuf;

use anyhow::Context;
use prism_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use prism_engine::device::Gpu;
use prism_engine::input::Key;
use prism_engine::logging::log_driver_info;
use prism_engine::render::RenderCtx;
use prism_engine::{Engine, EngineConfig};

use crate::demo::Demo;

pub const TITLE: &str = "prism sandbox";

/// Seconds between window title refreshes.
const TITLE_INTERVAL: f32 = 0.5;

pub struct SandboxApp {
    config: Option<EngineConfig>,
    model: Option<PathBuf>,
    engine: Option<Engine>,
    demo: Option<Demo>,
    title_timer: f32,
}

impl SandboxApp {
    pub fn new(config: EngineConfig, model: Option<PathBuf>) -> Self {
        Self {
            config: Some(config),
            model,
            engine: None,
            demo: None,
            title_timer: 0.0,
        }
    }
}

impl App for SandboxApp {
    fn on_gpu_ready(&mut self, _window: &WindowCtx<'_>, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let config = self.config.take().context("engine already initialized")?;
        let driver = gpu.driver_info();
        log_driver_info(&driver);

        let size = gpu.size();
        let rctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), (size.width, size.height));
        let mut engine =
            Engine::new(&rctx, &gpu.limits(), driver, config).context("engine initialization failed")?;

        let demo = Demo::build(&mut engine, gpu.device(), gpu.queue(), self.model.as_deref())?;
        log::info!(
            "scene: {} entities, {} lights; mode {}",
            engine.scene().entities.len(),
            engine.scene().lights.len(),
            engine.mode()
        );

        self.engine = Some(engine);
        self.demo = Some(demo);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (Some(engine), Some(demo)) = (self.engine.as_mut(), self.demo.as_ref()) else {
            return AppControl::Exit;
        };

        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let (w, h) = ctx.window.physical_size();
        engine.set_viewport(w, h);
        demo.animate(engine.scene_mut());
        engine.update(ctx.time.dt, ctx.input, ctx.input_frame);

        if ctx.input_frame.key_pressed(Key::F1) {
            log::info!("\n{}", engine.info_snapshot().report());
        }

        self.title_timer += ctx.time.dt;
        if self.title_timer >= TITLE_INTERVAL {
            self.title_timer = 0.0;
            ctx.window.set_title(&engine.info_snapshot().title(TITLE));
        }

        ctx.render(|rctx, target| Ok(engine.render(rctx, target)?))
    }
}
