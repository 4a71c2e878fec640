//! Animation systems.
//!
//! - [`play_animation`] starts a clip on a sprite, cross-fading or cutting
//!   the animations already playing.
//! - [`advance_sprite`] moves every animation on a sprite forward by one
//!   tick: completion and looping, event delivery, cross-fade weights and
//!   promotion of queued ("when done") clips.
//! - [`sprite_animation`] is the ECS system running [`advance_sprite`] on
//!   every [`SpriteInstance`] and triggering a [`SpriteAnimationEvent`] per
//!   delivered clip event.
//!
//! # Tick Flow
//!
//! 1. Each playing instance advances by `dt`; queued instances hold still
//! 2. Instances reaching their clip's end loop, finish or freeze by mode
//! 3. Clip events inside the tick's time window are delivered
//! 4. Weights move by `weight_velocity * dt`; faded-out instances go away
//! 5. A queued instance takes over once something finished or only one
//!    instance is left
//! 6. An empty sprite falls back to its default clip
//!
//! A tick whose `dt` spans more than one loop period only wraps once:
//! whole extra periods are dropped by the modulo and their events are not
//! delivered. No event is delivered twice in one tick.

use bevy_ecs::prelude::*;
use log::error;

use crate::components::animation::{AnimationInstance, AnimationMode};
use crate::components::sprite::SpriteInstance;
use crate::error::{Result, SpriteError};
use crate::events::animation::SpriteAnimationEvent;
use crate::resources::spritedefinition::{Clip, ClipEvent};
use crate::resources::worldtime::WorldTime;

/// Start clip `clip_name` on `sprite`; an empty name means the default clip.
///
/// Contract
/// - Unknown clip: logged and returned as [`SpriteError::UnknownClip`];
///   nothing changes.
/// - A clip already playing on the sprite is left alone.
/// - Immediate modes cut every other animation when `transition_time` is
///   zero, and otherwise start fading them out over `transition_time`.
/// - Queued modes ([`AnimationMode::is_deferred`]) leave the others playing.
/// - The new instance starts at time zero and fades in over
///   `transition_time`, or starts at full weight without one.
pub fn play_animation(
    sprite: &mut SpriteInstance,
    clip_name: &str,
    mode: AnimationMode,
    transition_time: f32,
) -> Result<()> {
    let clip = if clip_name.is_empty() {
        sprite.definition.default_clip_id()
    } else {
        match sprite.definition.find_clip(clip_name) {
            Some(clip) => clip,
            None => {
                error!(
                    "Animation {} not found in sprite {}",
                    clip_name,
                    sprite.definition.name()
                );
                return Err(SpriteError::UnknownClip {
                    sprite: sprite.definition.name().to_string(),
                    clip: clip_name.to_string(),
                });
            }
        }
    };

    if sprite.instances.iter().any(|inst| inst.clip == clip) {
        return Ok(());
    }

    if !mode.is_deferred() {
        if transition_time <= 0.0 {
            sprite.instances.clear();
        } else {
            let fade_out = -1.0 / transition_time;
            for inst in sprite.instances.iter_mut() {
                inst.weight_velocity = fade_out;
            }
        }
    }

    sprite
        .instances
        .push(AnimationInstance::new(clip, mode, transition_time));
    Ok(())
}

fn fire_window(clip: &Clip, from: f32, to: f32, fire: &mut impl FnMut(&ClipEvent)) {
    for event in clip.events_between(from, to) {
        fire(event);
    }
}

/// Advance every animation on `sprite` by `dt` seconds.
///
/// Clip events are delivered to the sprite's callback, then to `observer`.
/// Each instance reports the events in its `[old_time, new_time)` window,
/// in declaration order; a looping instance that wraps reports the tail of
/// the clip followed by the head.
pub fn advance_sprite(sprite: &mut SpriteInstance, dt: f32, mut observer: impl FnMut(&ClipEvent)) {
    let definition = &sprite.definition;
    let mut callback = sprite.event_callback.take();
    let mut fire = |event: &ClipEvent| {
        if let Some(callback) = callback.as_mut() {
            callback(&event.name, event.value);
        }
        observer(event);
    };

    let snapshot = std::mem::take(&mut sprite.instances);
    let mut completed = false;
    let mut pending: Option<AnimationInstance> = None;

    for mut inst in snapshot {
        let clip = definition.clip(inst.clip);
        let total_time = clip.total_time();
        let prev_time = inst.time;

        if !inst.mode.is_deferred() {
            inst.time += dt;
        }

        if inst.time >= total_time {
            match inst.mode {
                AnimationMode::Loop => {
                    inst.time %= total_time;
                    fire_window(clip, prev_time, total_time, &mut fire);
                    // The head never reaches back past where the tail began.
                    fire_window(clip, 0.0, inst.time.min(prev_time), &mut fire);
                    completed = true;
                }
                AnimationMode::Once => {
                    fire_window(clip, prev_time, total_time, &mut fire);
                    completed = true;
                    continue;
                }
                AnimationMode::OnceAndFreeze => {
                    inst.time = total_time;
                    fire_window(clip, prev_time, total_time, &mut fire);
                }
                AnimationMode::OnceWhenDone | AnimationMode::LoopWhenDone => {
                    unreachable!("queued animation {} ran past its end", clip.name())
                }
            }
        } else {
            fire_window(clip, prev_time, inst.time, &mut fire);
        }

        inst.weight += inst.weight_velocity * dt;
        if inst.weight >= 1.0 {
            inst.weight = 1.0;
            inst.weight_velocity = 0.0;
        }
        // A queued instance can still take over after fading out.
        if inst.mode.is_deferred() {
            pending = Some(inst.clone());
        }
        if inst.weight <= 0.0 {
            continue;
        }

        sprite.instances.push(inst);
    }

    if let Some(mut queued) = pending {
        if completed || sprite.instances.len() == 1 {
            queued.mode = queued.mode.promoted();
            queued.weight = 1.0;
            sprite.instances.clear();
            sprite.instances.push(queued);
        }
    }

    if sprite.instances.is_empty() {
        sprite.instances.push(AnimationInstance::new(
            definition.default_clip_id(),
            AnimationMode::Loop,
            0.0,
        ));
    }

    sprite.event_callback = callback;
}

/// Advance every sprite by the frame delta and broadcast its clip events.
///
/// Contract
/// - Reads [`WorldTime`] for the (already scaled) delta.
/// - Mutates each [`SpriteInstance`]'s animation list.
/// - Triggers one [`SpriteAnimationEvent`] per delivered clip event, after
///   the sprite's own callback has seen it.
pub fn sprite_animation(
    time: Res<WorldTime>,
    mut query: Query<(Entity, &mut SpriteInstance)>,
    mut commands: Commands,
) {
    for (entity, mut sprite) in query.iter_mut() {
        advance_sprite(&mut sprite, time.delta, |event| {
            commands.trigger(SpriteAnimationEvent {
                entity,
                name: event.name.clone(),
                value: event.value,
            });
        });
    }
}
