//! Draw-side interfaces.
//!
//! Sprites do not submit geometry themselves. They describe a draw through
//! a [`MaterialSink`]: pick a technique, bind one or two textures, set the
//! blend factor and submit a quad. The renderer behind it is free to batch,
//! defer or record.
//!
//! Techniques and parameters used by sprites:
//!
//! | Case            | Technique        | Textures                   | Scalars |
//! |-----------------|------------------|----------------------------|---------|
//! | single frame    | [`TECHNIQUE_SINGLE`] | [`SLOT_COLOR_MAP`]     | –       |
//! | blended frames  | [`TECHNIQUE_BLEND`]  | [`SLOT_COLOR_MAP_0`], [`SLOT_COLOR_MAP_1`] | [`PARAM_BLEND_SCALE`] |

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::components::drawparams::Color;
use crate::resources::texturestore::TextureHandle;

pub const TECHNIQUE_SINGLE: &str = "tex_col";
pub const TECHNIQUE_BLEND: &str = "tex_lerp_col";
pub const SLOT_COLOR_MAP: &str = "ColorMap";
pub const SLOT_COLOR_MAP_0: &str = "ColorMap0";
pub const SLOT_COLOR_MAP_1: &str = "ColorMap1";
pub const PARAM_BLEND_SCALE: &str = "Scale";

/// A material that sprite draws are submitted through.
pub trait MaterialSink {
    fn set_color(&mut self, color: Color);
    fn set_technique(&mut self, technique: &str);
    fn bind_texture(&mut self, slot: &str, texture: &TextureHandle);
    fn set_scalar_param(&mut self, name: &str, value: f32);
    /// Submit a quad: corners clockwise from the top-left, with matching UVs.
    fn submit(&mut self, quad: &[Vec2; 4], uv: &[Vec2; 4]);
}

/// Source of materials for sprite draws.
pub trait SpriteRenderer {
    /// Material called `name`, or the engine default when `name` is `None`
    /// or unknown.
    fn resolve_material(&mut self, name: Option<&str>) -> &mut dyn MaterialSink;
}

/// Named materials plus an engine-wide default.
pub struct MaterialStore<M> {
    default: M,
    materials: FxHashMap<String, M>,
}

impl<M: MaterialSink> MaterialStore<M> {
    pub fn new(default: M) -> Self {
        Self {
            default,
            materials: FxHashMap::default(),
        }
    }

    /// Add a material, replacing any with the same name.
    pub fn insert(&mut self, name: impl Into<String>, material: M) {
        self.materials.insert(name.into(), material);
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.materials.get(name)
    }

    pub fn default_material(&self) -> &M {
        &self.default
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }
}

impl<M: MaterialSink> SpriteRenderer for MaterialStore<M> {
    fn resolve_material(&mut self, name: Option<&str>) -> &mut dyn MaterialSink {
        if let Some(material) = name.and_then(|name| self.materials.get_mut(name)) {
            return material;
        }
        &mut self.default
    }
}
