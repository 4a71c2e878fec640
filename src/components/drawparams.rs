//! Per-draw configuration for sprites.
//!
//! [`DrawParams`] says where and how a sprite is drawn: tint colour,
//! position or explicit destination rectangle, texture sub-rectangle, scale,
//! rotation and axis flips. It is a plain value passed to
//! [`SpriteInstance::draw`](crate::components::sprite::SpriteInstance::draw),
//! and also a component so the
//! [`render_sprites`](crate::systems::render::render_sprites) pass can find
//! it next to a sprite.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::resources::spriteconfig::SpriteConfig;

/// RGBA colour with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]` as passed to materials.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Corners clockwise from the top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right(), self.top),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.left, self.bottom()),
        ]
    }
}

/// How to draw a sprite.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DrawParams {
    pub color: Color,
    /// Top-left corner of the default box (`size * scale`).
    pub position: Vec2,
    /// Explicit destination; overrides `position` and `scale`.
    pub rect: Option<Rect>,
    /// Texture sub-rectangle in UV space; defaults to the whole texture.
    pub tex_coord_rect: Option<Rect>,
    pub scale: f32,
    /// Radians, about the quad's centre.
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl DrawParams {
    /// Default draw position when none is configured.
    pub const DEFAULT_POSITION: Vec2 = Vec2::new(10.0, 10.0);

    /// Defaults with the origin taken from the configuration.
    pub fn from_config(config: &SpriteConfig) -> Self {
        Self {
            position: config.draw_origin,
            ..Self::default()
        }
    }

    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_tex_coord_rect(mut self, rect: Rect) -> Self {
        self.tex_coord_rect = Some(rect);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            position: Self::DEFAULT_POSITION,
            rect: None,
            tex_coord_rect: None,
            scale: 1.0,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }
}
