use glam::Vec3;

/// Light kind as stored in the uniform buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum LightType {
    Directional = 0,
    Point = 1,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub kind: LightType,
    pub strength: u32,
    pub color: Vec3,
    /// Used by directional lights.
    pub direction: Vec3,
    /// Used by point lights.
    pub position: Vec3,
}

impl Light {
    pub fn point(color: Vec3, position: Vec3) -> Self {
        Self {
            kind: LightType::Point,
            strength: 1,
            color,
            direction: Vec3::ZERO,
            position,
        }
    }

    pub fn directional(color: Vec3, direction: Vec3) -> Self {
        Self {
            kind: LightType::Directional,
            strength: 1,
            color,
            direction,
            position: Vec3::ZERO,
        }
    }
}
