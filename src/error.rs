//! Error types for sprite definition construction and playback requests.
//!
//! Only construction-time failures and rejected play requests surface as
//! [`SpriteError`] values. Asynchronous texture failures are reported through
//! the definition's readiness state instead (see
//! [`SpriteDefinition::check_ready`](crate::resources::spritedefinition::SpriteDefinition::check_ready)).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building sprite definitions or driving playback.
#[derive(Error, Debug)]
pub enum SpriteError {
    /// The definition file could not be read.
    #[error("failed to read sprite definition {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The definition file is not valid JSON or does not match the schema.
    #[error("failed to parse sprite definition {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A frame texture could not be created.
    #[error("failed to load texture {name}: {reason}")]
    Texture { name: String, reason: String },

    /// The definition does not declare a single clip.
    #[error("sprite {0} defines no animations")]
    EmptyDefinition(String),

    /// A clip declares no frames.
    #[error("animation {clip} in sprite {sprite} has no frames")]
    EmptyClip { sprite: String, clip: String },

    /// A clip's frame time is zero, negative or not a number.
    #[error("animation {clip} in sprite {sprite} has invalid frame time {frame_time}")]
    InvalidFrameTime {
        sprite: String,
        clip: String,
        frame_time: f32,
    },

    /// Two clips share the same name.
    #[error("animation {clip} declared twice in sprite {sprite}")]
    DuplicateClip { sprite: String, clip: String },

    /// The designated default clip does not exist.
    #[error("default animation {clip} not found in sprite {sprite}")]
    UnknownDefaultClip { sprite: String, clip: String },

    /// A play request named a clip the definition does not have.
    #[error("animation {clip} not found in sprite {sprite}")]
    UnknownClip { sprite: String, clip: String },

    /// The configuration file could not be loaded or saved.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type using [`SpriteError`].
pub type Result<T> = std::result::Result<T, SpriteError>;
