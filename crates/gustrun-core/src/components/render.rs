use serde::{Deserialize, Serialize};

use crate::entity::Component;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque white (no tint).
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Boosted tint.
    pub const GOLD: Self = Self::rgb(255, 200, 40);
    /// Shielded tint.
    pub const CYAN: Self = Self::rgb(80, 220, 255);
    /// Magnetic tint.
    pub const MAGENTA: Self = Self::rgb(230, 70, 220);
    /// Reversed tint.
    pub const LIME: Self = Self::rgb(150, 240, 90);
    /// Headwind tint.
    pub const SLATE: Self = Self::rgb(120, 140, 170);

    /// Opaque color from RGB.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// What a renderer needs to draw an entity. Position comes from the
/// entity's [`Transform`](super::Transform).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderComponent {
    /// Texture key resolved by the renderer.
    pub texture: String,
    /// Multiplicative tint.
    pub tint: Color,
    /// Hidden entities are skipped by renderers.
    pub visible: bool,
    /// Mirror the sprite horizontally.
    pub flip_x: bool,
}

impl RenderComponent {
    /// Visible, untinted sprite.
    #[must_use]
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            tint: Color::WHITE,
            visible: true,
            flip_x: false,
        }
    }
}

impl Component for RenderComponent {}
