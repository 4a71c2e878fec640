//! On-disk sprite definition format.
//!
//! A definition lives in `<asset_root>/<name>.sprite.json`:
//!
//! ```json
//! {
//!   "material": "sprites",
//!   "animations": [
//!     { "name": "idle", "frame_time": 0.2, "is_default": true,
//!       "elements": [ {"frame": {"texture": "idle0.png"}},
//!                     {"event": {"name": "blink", "value": 1.0}},
//!                     {"frame": {"texture": "idle1.png"}} ] }
//!   ]
//! }
//! ```
//!
//! Elements are read in order. An event is stamped with the time at which
//! the next frame starts, i.e. the summed duration of the frames before it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpriteError};
use crate::resources::spritedefinition::{Clip, SpriteDefinition};
use crate::resources::texturestore::TextureHandle;

/// Frame time of the single clip in a sprite made from a bare texture.
pub const BARE_TEXTURE_FRAME_TIME: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpriteSource {
    #[serde(default)]
    pub material: Option<String>,
    pub animations: Vec<ClipSource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClipSource {
    pub name: String,
    #[serde(default)]
    pub frame_time: Option<f32>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub elements: Vec<ClipElement>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipElement {
    Frame {
        texture: String,
    },
    Event {
        name: String,
        #[serde(default)]
        value: f32,
    },
}

impl SpriteSource {
    /// Read and parse a definition file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SpriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SpriteError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Definition showing a single texture: one clip named after it, one
    /// frame lasting [`BARE_TEXTURE_FRAME_TIME`].
    pub fn from_texture(texture: &str) -> Self {
        Self {
            material: None,
            animations: vec![ClipSource {
                name: texture.to_string(),
                frame_time: Some(BARE_TEXTURE_FRAME_TIME),
                is_default: true,
                elements: vec![ClipElement::Frame {
                    texture: texture.to_string(),
                }],
            }],
        }
    }

    /// Name of the default clip: the first one, unless a later clip is
    /// flagged `is_default` (the last flag wins).
    pub fn default_clip_name(&self) -> Option<&str> {
        self.animations
            .iter()
            .rev()
            .find(|clip| clip.is_default)
            .or_else(|| self.animations.first())
            .map(|clip| clip.name.as_str())
    }

    /// Build a [`SpriteDefinition`] called `name`.
    ///
    /// `request_texture` is called once per frame element; the first error
    /// it returns aborts the build.
    pub fn build(
        &self,
        name: &str,
        default_frame_time: f32,
        mut request_texture: impl FnMut(&str) -> Result<TextureHandle>,
    ) -> Result<SpriteDefinition> {
        let mut clips = Vec::with_capacity(self.animations.len());
        for source in &self.animations {
            let mut clip = Clip::new(
                source.name.as_str(),
                source.frame_time.unwrap_or(default_frame_time),
            );
            for element in &source.elements {
                match element {
                    ClipElement::Frame { texture } => clip.push_frame(request_texture(texture)?),
                    ClipElement::Event { name, value } => clip.push_event(name.as_str(), *value),
                }
            }
            clips.push(clip);
        }

        Ok(SpriteDefinition::new(name, clips, self.default_clip_name())?
            .with_material(self.material.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::texturestore::Texture;
    use std::sync::Arc;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn parse(json: &str) -> SpriteSource {
        serde_json::from_str(json).unwrap()
    }

    fn textures(name: &str) -> Result<TextureHandle> {
        Ok(Arc::new(Texture::loaded(name, 16, 16)))
    }

    const HERO: &str = r#"{
        "material": "sprites",
        "animations": [
            { "name": "idle", "frame_time": 0.2,
              "elements": [ {"frame": {"texture": "idle0.png"}},
                            {"event": {"name": "blink", "value": 1.5}},
                            {"frame": {"texture": "idle1.png"}},
                            {"frame": {"texture": "idle2.png"}},
                            {"event": {"name": "end"}} ] },
            { "name": "walk",
              "elements": [ {"frame": {"texture": "walk0.png"}} ] }
        ]
    }"#;

    #[test]
    fn test_parse_elements() {
        let source = parse(HERO);
        assert_eq!(source.material.as_deref(), Some("sprites"));
        assert_eq!(source.animations.len(), 2);
        assert_eq!(source.animations[0].elements.len(), 5);
        assert_eq!(
            source.animations[0].elements[4],
            ClipElement::Event {
                name: "end".to_string(),
                value: 0.0
            }
        );
        assert_eq!(source.animations[1].frame_time, None);
    }

    #[test]
    fn test_build_stamps_events_with_preceding_frame_time() {
        let def = parse(HERO).build("hero", 0.1, textures).unwrap();
        let idle = def.clip(def.find_clip("idle").unwrap());
        assert_eq!(idle.frame_count(), 3);
        assert_eq!(idle.events().len(), 2);
        assert_eq!(idle.events()[0].name, "blink");
        assert!(approx_eq(idle.events()[0].time, 0.2));
        assert_eq!(idle.events()[0].value, 1.5);
        assert!(approx_eq(idle.events()[1].time, 0.6));
    }

    #[test]
    fn test_build_uses_default_frame_time() {
        let def = parse(HERO).build("hero", 0.25, textures).unwrap();
        let walk = def.clip(def.find_clip("walk").unwrap());
        assert_eq!(walk.frame_time(), 0.25);
        assert_eq!(def.material(), Some("sprites"));
    }

    #[test]
    fn test_default_clip_is_first_without_flag() {
        let source = parse(HERO);
        assert_eq!(source.default_clip_name(), Some("idle"));
        let def = source.build("hero", 0.1, textures).unwrap();
        assert_eq!(def.default_clip().name(), "idle");
    }

    #[test]
    fn test_last_default_flag_wins() {
        let source = parse(
            r#"{ "animations": [
                { "name": "a", "elements": [ {"frame": {"texture": "a.png"}} ] },
                { "name": "b", "is_default": true, "elements": [ {"frame": {"texture": "b.png"}} ] },
                { "name": "c", "is_default": true, "elements": [ {"frame": {"texture": "c.png"}} ] }
            ] }"#,
        );
        assert_eq!(source.default_clip_name(), Some("c"));
    }

    #[test]
    fn test_texture_failure_aborts_build() {
        let mut requested = Vec::new();
        let err = parse(HERO)
            .build("hero", 0.1, |name| {
                requested.push(name.to_string());
                if name == "idle1.png" {
                    Err(SpriteError::Texture {
                        name: name.to_string(),
                        reason: "missing".to_string(),
                    })
                } else {
                    textures(name)
                }
            })
            .unwrap_err();
        assert!(matches!(err, SpriteError::Texture { .. }));
        assert_eq!(requested, vec!["idle0.png", "idle1.png"]);
    }

    #[test]
    fn test_clip_without_frames_is_rejected() {
        let source = parse(r#"{ "animations": [ { "name": "empty" } ] }"#);
        let err = source.build("hero", 0.1, textures).unwrap_err();
        assert!(matches!(err, SpriteError::EmptyClip { .. }));
    }

    #[test]
    fn test_from_texture() {
        let def = SpriteSource::from_texture("coin.png")
            .build("coin.png", 0.1, textures)
            .unwrap();
        assert_eq!(def.clips().len(), 1);
        let clip = def.default_clip();
        assert_eq!(clip.name(), "coin.png");
        assert_eq!(clip.frame_time(), BARE_TEXTURE_FRAME_TIME);
        assert_eq!(clip.frame_count(), 1);
    }

    #[test]
    fn test_from_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sprite.json");
        assert!(matches!(
            SpriteSource::from_path(&missing),
            Err(SpriteError::Io { .. })
        ));

        let broken = dir.path().join("broken.sprite.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            SpriteSource::from_path(&broken),
            Err(SpriteError::Parse { .. })
        ));
    }
}
