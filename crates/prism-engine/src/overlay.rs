//! Read-only frame and driver information.
//!
//! The sandbox shows a one-line summary in the window title and dumps the full
//! report to the log on demand.

use std::fmt::Write as _;

use crate::render::RenderMode;

/// Adapter and driver description captured at startup.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DriverInfo {
    pub adapter: String,
    pub backend: String,
    pub device_type: String,
    pub driver: String,
    pub driver_info: String,
    pub vendor_id: u32,
    pub device_id: u32,
    /// Optional features the adapter supports.
    pub features: Vec<String>,
}

impl DriverInfo {
    pub fn from_adapter(info: &wgpu::AdapterInfo, features: wgpu::Features) -> Self {
        Self {
            adapter: info.name.clone(),
            backend: format!("{:?}", info.backend),
            device_type: format!("{:?}", info.device_type),
            driver: info.driver.clone(),
            driver_info: info.driver_info.clone(),
            vendor_id: info.vendor,
            device_id: info.device,
            features: feature_names(features),
        }
    }
}

fn feature_names(features: wgpu::Features) -> Vec<String> {
    let mut names: Vec<String> = features
        .features_webgpu
        .iter_names()
        .map(|(name, _)| name.to_owned())
        .collect();
    names.extend(features.features_wgpu.iter_names().map(|(name, _)| name.to_owned()));
    names
}

/// What the overlay shows for one frame.
#[derive(Debug, Clone, Copy)]
pub struct InfoSnapshot<'a> {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub mode: RenderMode,
    pub driver: &'a DriverInfo,
}

impl InfoSnapshot<'_> {
    /// Compact single-line summary.
    pub fn title(&self, app: &str) -> String {
        format!(
            "{app} | {:.0} fps ({:.2} ms) | mode {} | {} ({})",
            self.fps, self.frame_time_ms, self.mode, self.driver.adapter, self.driver.backend
        )
    }

    /// Full multi-line report including the feature list.
    pub fn report(&self) -> String {
        let d = self.driver;
        let mut out = String::new();
        let _ = writeln!(out, "FPS: {:.1} ({:.2} ms)", self.fps, self.frame_time_ms);
        let _ = writeln!(out, "Current render mode: {}", self.mode);
        let _ = writeln!(out, "Render modes:");
        for mode in RenderMode::ALL {
            let _ = writeln!(out, "  {mode}");
        }
        let _ = writeln!(out, "Adapter: {} [{:04x}:{:04x}]", d.adapter, d.vendor_id, d.device_id);
        let _ = writeln!(out, "Backend: {} ({})", d.backend, d.device_type);
        let _ = writeln!(out, "Driver: {} {}", d.driver, d.driver_info);
        let _ = writeln!(out, "Features [{}]", d.features.len());
        for (i, name) in d.features.iter().enumerate() {
            let _ = writeln!(out, "  [{i}] {name}");
        }
        out
    }
}
