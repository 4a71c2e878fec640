//! ECS components for sprite entities.
//!
//! Submodules overview:
//! - [`animation`] – playback mode and per-clip playback state
//! - [`drawparams`] – placement, tint, flips and texture sub-rectangle for a draw
//! - [`sprite`] – a sprite placed in the world: shared definition plus playing clips

pub mod animation;
pub mod drawparams;
pub mod sprite;
