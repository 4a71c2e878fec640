//! Sprite definition registry.
//!
//! Definitions are shared by every [`SpriteInstance`] created from the same
//! name. The store only keeps weak handles: a definition lives as long as
//! some instance holds it, and the store notices it is gone on the next
//! lookup. Dead entries are swept whenever a new definition is registered.

use std::sync::{Arc, Weak};

use bevy_ecs::prelude::Resource;
use log::{debug, error};
use rustc_hash::FxHashMap;

use crate::components::sprite::SpriteInstance;
use crate::error::Result;
use crate::resources::spriteconfig::SpriteConfig;
use crate::resources::spritedefinition::SpriteDefinition;
use crate::resources::spritesource::SpriteSource;
use crate::resources::texturestore::TextureStore;

/// Registry of live sprite definitions keyed by name.
#[derive(Resource, Default)]
pub struct SpriteStore {
    definitions: FxHashMap<String, Weak<SpriteDefinition>>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live definition called `name`, if any instance still holds it.
    pub fn find(&self, name: &str) -> Option<Arc<SpriteDefinition>> {
        self.definitions.get(name).and_then(Weak::upgrade)
    }

    /// Register a definition under its own name, replacing any previous
    /// entry with that name.
    pub fn register(&mut self, definition: SpriteDefinition) -> Arc<SpriteDefinition> {
        self.purge();
        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.name().to_string(), Arc::downgrade(&definition));
        definition
    }

    /// Return the live definition called `name`, loading it on a miss.
    ///
    /// A name containing `.` is a texture file and yields a one-frame
    /// sprite; anything else is read from
    /// [`SpriteConfig::definition_path`]. Textures are requested
    /// asynchronously unless `immediate` is set or the configuration turns
    /// asynchronous loading off. The new definition is polled once, so one
    /// whose textures are all loaded is ready straight away.
    pub fn load(
        &mut self,
        name: &str,
        immediate: bool,
        config: &SpriteConfig,
        textures: &mut TextureStore,
    ) -> Result<Arc<SpriteDefinition>> {
        if let Some(definition) = self.find(name) {
            return Ok(definition);
        }

        let immediate = immediate || !config.async_loading;
        let source = if name.contains('.') {
            Ok(SpriteSource::from_texture(name))
        } else {
            SpriteSource::from_path(&config.definition_path(name))
        };
        let definition = source.and_then(|source| {
            source.build(name, config.default_frame_time, |texture| {
                textures.request(texture, immediate)
            })
        });

        match definition {
            Ok(definition) => {
                let ready = definition.check_ready();
                debug!("Sprite resource {} created (ready: {})", name, ready);
                Ok(self.register(definition))
            }
            Err(err) => {
                error!("Failed to load sprite resource {}: {}", name, err);
                Err(err)
            }
        }
    }

    /// Create an instance of the sprite called `name`, playing its default
    /// clip.
    pub fn create(
        &mut self,
        name: &str,
        immediate: bool,
        config: &SpriteConfig,
        textures: &mut TextureStore,
    ) -> Result<SpriteInstance> {
        let definition = self.load(name, immediate, config, textures)?;
        Ok(SpriteInstance::new(definition))
    }

    /// Number of live holders of the definition called `name`.
    pub fn ref_count(&self, name: &str) -> usize {
        self.definitions
            .get(name)
            .map_or(0, Weak::strong_count)
    }

    /// Drop entries whose definition is gone. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let before = self.definitions.len();
        self.definitions.retain(|_, definition| definition.strong_count() > 0);
        before - self.definitions.len()
    }

    /// Number of live definitions.
    pub fn len(&self) -> usize {
        self.definitions
            .values()
            .filter(|definition| definition.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
