//! Shared sprite definitions.
//!
//! A [`SpriteDefinition`] is the immutable description of a sprite: a table
//! of named [`Clip`]s, the default clip, an optional material name and the
//! readiness state of the textures its frames point at. One definition is
//! shared (through an `Arc`) by every
//! [`SpriteInstance`](crate::components::sprite::SpriteInstance) created
//! under its name, and is dropped with the last of them.
//!
//! Animation instances refer to clips through [`ClipId`], an index into the
//! definition's clip table, never through an owning pointer.
//!
//! # Readiness
//!
//! Definitions start out [`LoadState::Loading`] and are promoted by
//! [`SpriteDefinition::check_ready`], which polls every frame texture. The
//! poll is cheap once the state has settled; `Ready` and `Failed` are both
//! terminal.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use log::error;
use rustc_hash::FxHashMap;

use crate::error::{Result, SpriteError};
use crate::resources::texturestore::{LoadState, TextureHandle};

/// Named marker on a clip's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEvent {
    pub name: String,
    /// Seconds from the start of the clip, in `[0, total_time)`.
    pub time: f32,
    pub value: f32,
}

/// One frame of a clip.
#[derive(Debug, Clone)]
pub struct Frame {
    pub texture: TextureHandle,
}

/// Index of a clip inside its [`SpriteDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub(crate) usize);

impl ClipId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named animation: frames shown for a fixed time each, plus events.
#[derive(Debug, Clone)]
pub struct Clip {
    name: String,
    frame_time: f32,
    frames: Vec<Frame>,
    events: Vec<ClipEvent>,
}

impl Clip {
    /// Frame time used when a definition does not give one.
    pub const DEFAULT_FRAME_TIME: f32 = 0.1;

    pub fn new(name: impl Into<String>, frame_time: f32) -> Self {
        Self {
            name: name.into(),
            frame_time,
            frames: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Append a frame showing `texture`.
    pub fn push_frame(&mut self, texture: TextureHandle) {
        self.frames.push(Frame { texture });
    }

    /// Append an event positioned after the frames pushed so far.
    pub fn push_event(&mut self, name: impl Into<String>, value: f32) {
        let time = self.total_time();
        self.push_event_at(name, time, value);
    }

    /// Append an event at an explicit time.
    pub fn push_event_at(&mut self, name: impl Into<String>, time: f32, value: f32) {
        self.events.push(ClipEvent {
            name: name.into(),
            time,
            value,
        });
    }

    pub fn with_frame(mut self, texture: TextureHandle) -> Self {
        self.push_frame(texture);
        self
    }

    pub fn with_event_at(mut self, name: impl Into<String>, time: f32, value: f32) -> Self {
        self.push_event_at(name, time, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Events in declaration order.
    pub fn events(&self) -> &[ClipEvent] {
        &self.events
    }

    /// `frame_time * frame_count`.
    pub fn total_time(&self) -> f32 {
        self.frame_time * self.frames.len() as f32
    }

    /// Events whose time lies in the half-open window `[from, to)`, in
    /// declaration order.
    pub fn events_between(&self, from: f32, to: f32) -> impl Iterator<Item = &ClipEvent> {
        self.events
            .iter()
            .filter(move |event| from <= event.time && event.time < to)
    }
}

/// Shared, reference-counted description of a sprite.
#[derive(Debug)]
pub struct SpriteDefinition {
    name: String,
    clips: Vec<Clip>,
    clip_ids: FxHashMap<String, ClipId>,
    default_clip: ClipId,
    material: Option<String>,
    state: AtomicU8,
    width: AtomicU32,
    height: AtomicU32,
}

impl SpriteDefinition {
    /// Build a definition from its clips.
    ///
    /// `default_clip` names the clip played when none is requested; `None`
    /// picks the first clip. Every clip must have at least one frame and a
    /// positive frame time, and clip names must be unique. The definition
    /// starts out loading; call [`check_ready`](Self::check_ready) to
    /// promote it.
    pub fn new(name: impl Into<String>, clips: Vec<Clip>, default_clip: Option<&str>) -> Result<Self> {
        let name = name.into();
        if clips.is_empty() {
            return Err(SpriteError::EmptyDefinition(name));
        }

        let mut clip_ids = FxHashMap::default();
        for (index, clip) in clips.iter().enumerate() {
            if clip.frames.is_empty() {
                return Err(SpriteError::EmptyClip {
                    sprite: name,
                    clip: clip.name.clone(),
                });
            }
            if !(clip.frame_time > 0.0) {
                return Err(SpriteError::InvalidFrameTime {
                    sprite: name,
                    clip: clip.name.clone(),
                    frame_time: clip.frame_time,
                });
            }
            if clip_ids.insert(clip.name.clone(), ClipId(index)).is_some() {
                return Err(SpriteError::DuplicateClip {
                    sprite: name,
                    clip: clip.name.clone(),
                });
            }
        }

        let default_clip = match default_clip {
            None => ClipId(0),
            Some(clip) => match clip_ids.get(clip) {
                Some(id) => *id,
                None => {
                    return Err(SpriteError::UnknownDefaultClip {
                        sprite: name,
                        clip: clip.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            name,
            clips,
            clip_ids,
            default_clip,
            material: None,
            state: AtomicU8::new(LoadState::Loading as u8),
            width: AtomicU32::new(0),
            height: AtomicU32::new(0),
        })
    }

    /// Attach a render material by name.
    pub fn with_material(mut self, material: Option<String>) -> Self {
        self.material = material;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Current state without polling textures.
    pub fn state(&self) -> LoadState {
        LoadState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Poll the frame textures and settle the definition's state.
    ///
    /// Returns `true` only when the definition is ready to draw. While any
    /// texture is still loading the state stays `Loading`. The first failed
    /// texture makes the definition `Failed` for good, logged once. When all
    /// textures are loaded the display size is taken from the default
    /// clip's first frame.
    ///
    /// # Panics
    ///
    /// In debug builds, if that first frame has a zero dimension.
    pub fn check_ready(&self) -> bool {
        match self.state() {
            LoadState::Ready => return true,
            LoadState::Failed => return false,
            LoadState::Loading => {}
        }

        for frame in self.clips.iter().flat_map(|clip| clip.frames.iter()) {
            match frame.texture.load_state() {
                LoadState::Loading => return false,
                LoadState::Failed => {
                    if self.transition(LoadState::Failed) {
                        error!(
                            "Sprite resource {} failed to load (asynchronously): texture {} failed",
                            self.name,
                            frame.texture.name()
                        );
                    }
                    return false;
                }
                LoadState::Ready => {}
            }
        }

        let first = &self.default_clip().frames[0].texture;
        let (width, height) = (first.width(), first.height());
        debug_assert!(
            width != 0 && height != 0,
            "sprite {} has a zero-sized default frame ({}x{})",
            self.name,
            width,
            height
        );
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
        self.transition(LoadState::Ready);
        self.state() == LoadState::Ready
    }

    fn transition(&self, to: LoadState) -> bool {
        self.state
            .compare_exchange(
                LoadState::Loading as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Display width in pixels, or `0` while not ready.
    pub fn width(&self) -> u32 {
        if !self.check_ready() {
            return 0;
        }
        self.width.load(Ordering::Relaxed)
    }

    /// Display height in pixels, or `0` while not ready.
    pub fn height(&self) -> u32 {
        if !self.check_ready() {
            return 0;
        }
        self.height.load(Ordering::Relaxed)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, id: ClipId) -> &Clip {
        &self.clips[id.0]
    }

    pub fn find_clip(&self, name: &str) -> Option<ClipId> {
        self.clip_ids.get(name).copied()
    }

    pub fn default_clip_id(&self) -> ClipId {
        self.default_clip
    }

    pub fn default_clip(&self) -> &Clip {
        self.clip(self.default_clip)
    }
}
