//! ECS resources and shared sprite data.
//!
//! Overview
//! - `material` – draw-side traits and a named material store
//! - `spriteconfig` – INI-backed engine configuration
//! - `spritedefinition` – clips, frames, events and the readiness gate
//! - `spritesource` – JSON definition format and its conversion to definitions
//! - `spritestore` – registry of live, shared definitions
//! - `texturestore` – texture records, their cache and the loader bridge
//! - `worldtime` – simulation clock read by the animation system

pub mod material;
pub mod spriteconfig;
pub mod spritedefinition;
pub mod spritesource;
pub mod spritestore;
pub mod texturestore;
pub mod worldtime;
