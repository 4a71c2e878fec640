//! Clip event notifications.
//!
//! The [`sprite_animation`](crate::systems::animation::sprite_animation)
//! system triggers a [`SpriteAnimationEvent`] for every clip event crossed
//! while advancing a sprite. Observers can subscribe to it to play sounds,
//! spawn effects or drive gameplay without installing a callback on each
//! [`SpriteInstance`](crate::components::sprite::SpriteInstance).
//!
//! [`log_animation_event`] is a minimal observer that only logs.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

/// Event fired when a sprite's playback crosses a clip event.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SpriteAnimationEvent {
    /// Entity carrying the sprite.
    pub entity: Entity,
    /// Name of the clip event.
    pub name: String,
    /// Value attached to the clip event.
    pub value: f32,
}

/// Global observer that logs every animation event at debug level.
pub fn log_animation_event(trigger: On<SpriteAnimationEvent>) {
    let event = trigger.event();
    debug!(
        "Animation event '{}' ({}) on {:?}",
        event.name, event.value, event.entity
    );
}
