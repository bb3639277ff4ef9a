use glam::Vec3;

use crate::resources::TextureKey;
use crate::utils::color::hex;

/// Which faces of a mesh are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Shading model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    /// Lit by scene lights with a simple roughness / metalness response.
    Standard { roughness: f32, metalness: f32 },
    /// Unlit; outputs `color * map` directly.
    Basic,
}

/// Surface description of a mesh.
///
/// `color` is linear RGB. Convenience constructors take sRGB hex literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Vec3,
    pub emissive: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub map: Option<TextureKey>,
}

impl Material {
    /// Lit material with the given sRGB hex color.
    #[must_use]
    pub fn standard(color: u32) -> Self {
        Self {
            kind: MaterialKind::Standard {
                roughness: 0.5,
                metalness: 0.0,
            },
            color: hex(color),
            emissive: Vec3::ZERO,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            map: None,
        }
    }

    /// Unlit material with the given sRGB hex color.
    #[must_use]
    pub fn basic(color: u32) -> Self {
        Self {
            kind: MaterialKind::Basic,
            ..Self::standard(color)
        }
    }

    #[must_use]
    pub fn with_roughness(mut self, value: f32) -> Self {
        if let MaterialKind::Standard { roughness, .. } = &mut self.kind {
            *roughness = value.clamp(0.0, 1.0);
        }
        self
    }

    #[must_use]
    pub fn with_metalness(mut self, value: f32) -> Self {
        if let MaterialKind::Standard { metalness, .. } = &mut self.kind {
            *metalness = value.clamp(0.0, 1.0);
        }
        self
    }

    #[must_use]
    pub fn with_emissive(mut self, color: u32, intensity: f32) -> Self {
        self.emissive = hex(color) * intensity;
        self
    }

    /// Sets opacity; anything below 1 switches the material to blended drawing.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    #[must_use]
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    #[must_use]
    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    #[must_use]
    pub fn with_map(mut self, map: TextureKey) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn is_lit(&self) -> bool {
        matches!(self.kind, MaterialKind::Standard { .. })
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(0xffffff)
    }
}
