//! Sprite systems.
//!
//! Submodules overview
//! - [`animation`] – play requests, the per-tick blend update and its ECS system
//! - [`render`] – frame sampling, quad construction and draw submission
//! - [`textureloader`] – background thread completing queued textures
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod render;
pub mod textureloader;
pub mod time;
