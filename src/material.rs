// Material module for Starfield-3D

use crate::math::Color;
use crate::scene::TextureId;

/// How a surface reacts to the scene lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Lit by the ambient and point lights
    Standard,
    /// Ignores lighting entirely
    Basic,
}

/// Surface appearance of a mesh. Immutable once the object is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: Color,
    pub map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            shading: Shading::Standard,
            color,
            map: None,
            normal_map: None,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self {
            shading: Shading::Basic,
            color,
            map: None,
            normal_map: None,
        }
    }

    pub fn with_map(mut self, texture: TextureId) -> Self {
        self.map = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: TextureId) -> Self {
        self.normal_map = Some(texture);
        self
    }

    pub fn is_lit(&self) -> bool {
        self.shading == Shading::Standard
    }

    /// True if `texture` feeds either map slot
    pub fn uses(&self, texture: TextureId) -> bool {
        self.map == Some(texture) || self.normal_map == Some(texture)
    }
}
