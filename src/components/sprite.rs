use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

use crate::components::animation::{AnimationInstance, AnimationMode};
use crate::components::drawparams::DrawParams;
use crate::error::Result;
use crate::resources::material::SpriteRenderer;
use crate::resources::spritedefinition::SpriteDefinition;
use crate::systems::animation::{advance_sprite, play_animation};
use crate::systems::render::{DrawData, draw_sprite, sample_sprite};

/// Callback receiving `(event_name, event_value)` for each clip event.
///
/// Anything the callback needs beyond that is captured by the closure.
pub type EventCallback = Box<dyn FnMut(&str, f32) + Send + Sync>;

/// A sprite placed in the world: a shared definition plus the animations
/// currently playing on it.
///
/// Creating one starts the definition's default clip, so the instance list
/// is never empty. Dropping it releases its hold on the definition.
#[derive(Component)]
pub struct SpriteInstance {
    pub(crate) definition: Arc<SpriteDefinition>,
    pub(crate) instances: SmallVec<[AnimationInstance; 4]>,
    pub(crate) event_callback: Option<EventCallback>,
}

impl SpriteInstance {
    /// Create an instance of `definition` playing its default clip.
    pub fn new(definition: Arc<SpriteDefinition>) -> Self {
        let mut instances = SmallVec::new();
        instances.push(AnimationInstance::new(
            definition.default_clip_id(),
            AnimationMode::Loop,
            0.0,
        ));
        Self {
            definition,
            instances,
            event_callback: None,
        }
    }

    /// New instance sharing this one's definition.
    ///
    /// Playback starts over on the default clip and no callback is carried.
    pub fn clone_sprite(&self) -> Self {
        Self::new(Arc::clone(&self.definition))
    }

    pub fn definition(&self) -> &Arc<SpriteDefinition> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Animations currently playing, in start order.
    pub fn instances(&self) -> &[AnimationInstance] {
        &self.instances
    }

    pub fn set_event_callback(&mut self, callback: impl FnMut(&str, f32) + Send + Sync + 'static) {
        self.event_callback = Some(Box::new(callback));
    }

    pub fn clear_event_callback(&mut self) {
        self.event_callback = None;
    }

    /// Play clip `clip_name` (empty for the default clip).
    ///
    /// See [`play_animation`] for the cross-fade rules.
    pub fn play(&mut self, clip_name: &str, mode: AnimationMode, transition_time: f32) -> Result<()> {
        play_animation(self, clip_name, mode, transition_time)
    }

    /// Advance playback by `dt` seconds, delivering clip events to the callback.
    pub fn update(&mut self, dt: f32) {
        advance_sprite(self, dt, |_| {});
    }

    /// Frame selection and geometry for the current state, if drawable.
    pub fn sample(&self, params: &DrawParams) -> Option<DrawData<'_>> {
        sample_sprite(self, params)
    }

    /// Draw through `renderer`. Returns `false` when nothing was drawn.
    pub fn draw(&self, params: &DrawParams, renderer: &mut dyn SpriteRenderer) -> bool {
        draw_sprite(self, params, renderer)
    }

    /// Whether the definition has finished loading.
    pub fn is_ready(&self) -> bool {
        self.definition.check_ready()
    }

    /// Display width in pixels, `0` until ready.
    pub fn width(&self) -> u32 {
        self.definition.width()
    }

    /// Display height in pixels, `0` until ready.
    pub fn height(&self) -> u32 {
        self.definition.height()
    }
}

impl fmt::Debug for SpriteInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteInstance")
            .field("definition", &self.definition.name())
            .field("instances", &self.instances)
            .field("event_callback", &self.event_callback.is_some())
            .finish()
    }
}
