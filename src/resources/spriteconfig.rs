//! Sprite engine configuration resource.
//!
//! Settings loaded from an INI configuration file. Missing keys keep safe
//! defaults, so an absent file is not fatal for callers that choose to ignore
//! the load error.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sprites]
//! asset_root = ./assets/sprites
//! async_loading = true
//! default_frame_time = 0.1
//!
//! [draw]
//! origin_x = 10
//! origin_y = 10
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;

use crate::error::{Result, SpriteError};

const DEFAULT_ASSET_ROOT: &str = "./assets/sprites";
const DEFAULT_ASYNC_LOADING: bool = true;
const DEFAULT_FRAME_TIME: f32 = 0.1;
const DEFAULT_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const DEFAULT_CONFIG_PATH: &str = "./sprites.ini";

/// Sprite engine configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SpriteConfig {
    /// Directory holding `*.sprite.json` definitions and their textures.
    pub asset_root: PathBuf,
    /// Engine-wide switch for asynchronous texture loading.
    pub async_loading: bool,
    /// Frame time for clips that do not declare one.
    pub default_frame_time: f32,
    /// Default draw position.
    pub draw_origin: Vec2,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteConfig {
    /// Create a configuration with safe default values.
    pub fn new() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            async_loading: DEFAULT_ASYNC_LOADING,
            default_frame_time: DEFAULT_FRAME_TIME,
            draw_origin: DEFAULT_ORIGIN,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Returns an error if the
    /// file cannot be read or a frame time is not positive.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| SpriteError::Config(format!("failed to load config file: {}", e)))?;

        // [sprites] section
        if let Some(root) = config.get("sprites", "asset_root") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(async_loading) = config.getbool("sprites", "async_loading").ok().flatten() {
            self.async_loading = async_loading;
        }
        if let Some(frame_time) = config.getfloat("sprites", "default_frame_time").ok().flatten() {
            if frame_time <= 0.0 {
                return Err(SpriteError::Config(format!(
                    "default_frame_time must be positive, got {}",
                    frame_time
                )));
            }
            self.default_frame_time = frame_time as f32;
        }

        // [draw] section
        if let Some(x) = config.getfloat("draw", "origin_x").ok().flatten() {
            self.draw_origin.x = x as f32;
        }
        if let Some(y) = config.getfloat("draw", "origin_y").ok().flatten() {
            self.draw_origin.y = y as f32;
        }

        info!(
            "Loaded sprite config: root={:?}, async={}, frame_time={}, origin=({}, {})",
            self.asset_root,
            self.async_loading,
            self.default_frame_time,
            self.draw_origin.x,
            self.draw_origin.y
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        // [sprites] section
        config.set(
            "sprites",
            "asset_root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );
        config.set("sprites", "async_loading", Some(self.async_loading.to_string()));
        config.set(
            "sprites",
            "default_frame_time",
            Some(self.default_frame_time.to_string()),
        );

        // [draw] section
        config.set("draw", "origin_x", Some(self.draw_origin.x.to_string()));
        config.set("draw", "origin_y", Some(self.draw_origin.y.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| SpriteError::Config(format!("failed to save config file: {}", e)))?;

        info!("Saved sprite config to {:?}", self.config_path);

        Ok(())
    }

    /// Path of the JSON definition for sprite `name`.
    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.asset_root.join(format!("{}.sprite.json", name))
    }
}
