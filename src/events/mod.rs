//! Event types and observers.
//!
//! Submodules:
//! - [`animation`] – clip events crossed during playback, triggered per entity
//! - [`textureload`] – commands for the background texture loader thread
pub mod animation;
pub mod textureload;
