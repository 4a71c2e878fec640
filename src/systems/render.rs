//! Sprite sampling and drawing.
//!
//! [`sample_sprite`] is the read-only half of drawing: it picks the visible
//! animation, works out which frame or pair of frames to show and builds the
//! destination quad and UVs. [`draw_sprite`] hands the result to a
//! [`SpriteRenderer`]. Neither touches playback time or weights, so a sprite
//! can be drawn any number of times per tick.
//!
//! # Frame interpolation
//!
//! For a clip of `n > 1` frames at time `t`, the continuous frame position
//! is `p = n * t / total_time`. The sprite blends frame `floor(p)` (clamped
//! to the last frame) into the following one, wrapping to frame 0 after the
//! last, by `p - floor(p)`.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::animation::AnimationInstance;
use crate::components::drawparams::{Color, DrawParams, Rect};
use crate::components::sprite::SpriteInstance;
use crate::resources::material::{
    PARAM_BLEND_SCALE, SLOT_COLOR_MAP, SLOT_COLOR_MAP_0, SLOT_COLOR_MAP_1, SpriteRenderer,
    TECHNIQUE_BLEND, TECHNIQUE_SINGLE,
};
use crate::resources::spritedefinition::Clip;
use crate::resources::texturestore::TextureHandle;

const FULL_UV: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Frame selection for one draw.
#[derive(Debug, Clone)]
pub enum FrameSample<'a> {
    /// Single-frame clip, drawn as is.
    Single { texture: &'a TextureHandle },
    /// Two adjacent frames blended by `factor` in `[0, 1)`.
    Blend {
        first: &'a TextureHandle,
        next: &'a TextureHandle,
        first_index: usize,
        next_index: usize,
        factor: f32,
    },
}

impl FrameSample<'_> {
    pub fn blend_factor(&self) -> f32 {
        match self {
            FrameSample::Single { .. } => 0.0,
            FrameSample::Blend { factor, .. } => *factor,
        }
    }
}

/// Everything a renderer needs to draw a sprite once.
#[derive(Debug, Clone)]
pub struct DrawData<'a> {
    pub frames: FrameSample<'a>,
    /// Destination corners clockwise from the top-left.
    pub quad: [Vec2; 4],
    pub uv: [Vec2; 4],
    pub color: Color,
    pub material: Option<&'a str>,
}

/// The visible instance: highest weight among those not queued.
///
/// Ties go to the instance that started first.
pub fn dominant_instance(instances: &[AnimationInstance]) -> Option<&AnimationInstance> {
    let mut best: Option<&AnimationInstance> = None;
    for inst in instances.iter().filter(|inst| !inst.mode.is_deferred()) {
        match best {
            Some(current) if inst.weight <= current.weight => {}
            _ => best = Some(inst),
        }
    }
    best
}

/// Frame or frame pair to show for `clip` at `time` seconds.
pub fn sample_frames(clip: &Clip, time: f32) -> FrameSample<'_> {
    let frames = clip.frames();
    if frames.len() == 1 {
        return FrameSample::Single {
            texture: &frames[0].texture,
        };
    }

    let count = frames.len();
    let position = count as f32 * (time / clip.total_time());
    let floor = position.floor();
    let first_index = (floor as i64).clamp(0, count as i64 - 1) as usize;
    let next_index = (first_index + 1) % count;

    FrameSample::Blend {
        first: &frames[first_index].texture,
        next: &frames[next_index].texture,
        first_index,
        next_index,
        factor: position - floor,
    }
}

/// Texture coordinates after the sub-rectangle and flips are applied.
pub fn texture_coords(params: &DrawParams) -> [Vec2; 4] {
    let mut uv = match params.tex_coord_rect {
        Some(rect) => rect.corners(),
        None => FULL_UV,
    };
    if params.flip_x {
        for corner in uv.iter_mut() {
            corner.x = 1.0 - corner.x;
        }
    }
    if params.flip_y {
        for corner in uv.iter_mut() {
            corner.y = 1.0 - corner.y;
        }
    }
    uv
}

/// Destination quad for a sprite of `size` pixels.
///
/// Uses the explicit rectangle when given, else `position` and
/// `size * scale`. Rotation turns the quad about its own centre.
pub fn destination_quad(params: &DrawParams, size: Vec2) -> [Vec2; 4] {
    let mut quad = match params.rect {
        Some(rect) => rect.corners(),
        None => {
            let extent = size * params.scale;
            Rect::new(params.position.x, params.position.y, extent.x, extent.y).corners()
        }
    };

    if params.rotation != 0.0 {
        let center = Vec2::new(
            (quad[0].x + quad[1].x) * 0.5,
            (quad[0].y + quad[2].y) * 0.5,
        );
        let rotation = Vec2::from_angle(params.rotation);
        for corner in quad.iter_mut() {
            *corner = center + rotation.rotate(*corner - center);
        }
    }

    quad
}

/// Build the draw description for `sprite`, or `None` while its definition
/// is not ready.
///
/// # Panics
///
/// If the sprite has no visible animation instance. The animation system
/// never leaves a sprite in that state.
pub fn sample_sprite<'a>(sprite: &'a SpriteInstance, params: &DrawParams) -> Option<DrawData<'a>> {
    let definition = &sprite.definition;
    if !definition.check_ready() {
        return None;
    }

    let Some(instance) = dominant_instance(&sprite.instances) else {
        panic!(
            "sprite {} has no visible animation instance",
            definition.name()
        );
    };

    let clip = definition.clip(instance.clip);
    let size = Vec2::new(definition.width() as f32, definition.height() as f32);

    Some(DrawData {
        frames: sample_frames(clip, instance.time),
        quad: destination_quad(params, size),
        uv: texture_coords(params),
        color: params.color,
        material: definition.material(),
    })
}

/// Draw `sprite` through `renderer`. Returns `false` when not ready.
pub fn draw_sprite(sprite: &SpriteInstance, params: &DrawParams, renderer: &mut dyn SpriteRenderer) -> bool {
    let Some(data) = sample_sprite(sprite, params) else {
        return false;
    };

    let material = renderer.resolve_material(data.material);
    material.set_color(data.color);
    match data.frames {
        FrameSample::Single { texture } => {
            material.set_technique(TECHNIQUE_SINGLE);
            material.bind_texture(SLOT_COLOR_MAP, texture);
        }
        FrameSample::Blend {
            first,
            next,
            factor,
            ..
        } => {
            material.set_technique(TECHNIQUE_BLEND);
            material.bind_texture(SLOT_COLOR_MAP_0, first);
            material.bind_texture(SLOT_COLOR_MAP_1, next);
            material.set_scalar_param(PARAM_BLEND_SCALE, factor);
        }
    }
    material.submit(&data.quad, &data.uv);
    true
}

/// Draw every entity that has both a [`SpriteInstance`] and [`DrawParams`].
///
/// Returns the number of sprites actually drawn; sprites still loading or
/// failed are skipped.
pub fn render_sprites(world: &mut World, renderer: &mut dyn SpriteRenderer) -> usize {
    let mut query = world.query::<(&SpriteInstance, &DrawParams)>();
    let mut drawn = 0;
    for (sprite, params) in query.iter(world) {
        if draw_sprite(sprite, params, renderer) {
            drawn += 1;
        }
    }
    drawn
}
