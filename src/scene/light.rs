use glam::Vec3;
use uuid::Uuid;

use crate::utils::color::hex;

/// Light variants supported by the forward shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Parallel light shining from the node's world position towards the
    /// world origin.
    Directional,
    /// Omni light with a smooth falloff reaching zero at `range`.
    Point { range: f32 },
    /// Sky/ground gradient: `color` from above, `ground_color` from below.
    Hemisphere { ground_color: Vec3 },
}

/// Light component attached to a scene node.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Point { range },
        }
    }

    #[must_use]
    pub fn new_hemisphere(sky: Vec3, ground: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color: sky,
            intensity,
            kind: LightKind::Hemisphere {
                ground_color: ground,
            },
        }
    }

    /// Point light from an sRGB hex color.
    #[must_use]
    pub fn point_hex(color: u32, intensity: f32, range: f32) -> Self {
        Self::new_point(hex(color), intensity, range)
    }
}

/// Uniform ambient term added to every lit surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.0,
        }
    }
}
