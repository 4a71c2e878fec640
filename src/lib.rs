//! Spriteblend library.
//!
//! Shared sprite definitions with cross-faded clip playback, interpolated
//! frame blending and clip events, exposed as `bevy_ecs` components,
//! resources, systems and events.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
