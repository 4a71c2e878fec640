//! Per-sprite playback state.
//!
//! An [`AnimationInstance`] is one clip playing on one sprite. A sprite may
//! run several at once while cross-fading; their [`AnimationMode`] decides
//! what happens when a clip reaches its end.

use crate::resources::spritedefinition::ClipId;

/// Playback policy of an animation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationMode {
    /// Wrap around at the end, keeping the overshoot.
    #[default]
    Loop,
    /// Play to the end, then drop the instance.
    Once,
    /// Play to the end and hold the last frame.
    OnceAndFreeze,
    /// Wait until the current animations finish, then play as [`Once`](Self::Once).
    OnceWhenDone,
    /// Wait until the current animations finish, then play as [`Loop`](Self::Loop).
    LoopWhenDone,
}

impl AnimationMode {
    /// Whether the instance is queued behind the running animations.
    pub fn is_deferred(self) -> bool {
        matches!(self, AnimationMode::OnceWhenDone | AnimationMode::LoopWhenDone)
    }

    /// Mode a deferred instance switches to when it takes over.
    pub fn promoted(self) -> Self {
        match self {
            AnimationMode::OnceWhenDone => AnimationMode::Once,
            AnimationMode::LoopWhenDone => AnimationMode::Loop,
            other => other,
        }
    }
}

/// One clip playing on a sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationInstance {
    /// Clip in the sprite's definition.
    pub clip: ClipId,
    /// Seconds into the clip.
    pub time: f32,
    pub mode: AnimationMode,
    /// Blend weight in `[0, 1]`.
    pub weight: f32,
    /// Weight change per second; negative while fading out.
    pub weight_velocity: f32,
}

impl AnimationInstance {
    /// Start `clip` from the beginning, fading in over `transition_time`
    /// seconds, or at full weight when it is zero or negative.
    pub fn new(clip: ClipId, mode: AnimationMode, transition_time: f32) -> Self {
        if transition_time <= 0.0 {
            Self {
                clip,
                time: 0.0,
                mode,
                weight: 1.0,
                weight_velocity: 0.0,
            }
        } else {
            Self {
                clip,
                time: 0.0,
                mode,
                weight: 0.0,
                weight_velocity: 1.0 / transition_time,
            }
        }
    }
}
