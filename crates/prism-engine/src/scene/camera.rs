use glam::{Mat4, Vec3};

/// Perspective camera looking at a fixed target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 2.0, 6.0),
            target: Vec3::new(0.0, 1.8, 0.0),
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 1000.0,
            fov_deg: 60.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Right-handed projection with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Updates the aspect ratio; zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Slides the eye in the view plane by a pointer delta in pixels.
    ///
    /// Dragging right moves the eye left and dragging down moves it up, so
    /// the scene follows the pointer.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        const PIXELS_PER_UNIT: f32 = 50.0;
        self.position.x -= dx / PIXELS_PER_UNIT;
        self.position.y += dy / PIXELS_PER_UNIT;
    }
}
