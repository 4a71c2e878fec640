//! Texture dependencies of sprite frames.
//!
//! Frames never own pixel data. They hold a [`TextureHandle`], a shared
//! pointer to anything implementing [`TextureSource`], and only ever ask it
//! three things: has it finished loading, how wide is it, how tall is it.
//!
//! [`TextureStore`] is the stock provider. It caches [`Texture`] records by
//! name and either decodes them on the spot or hands them to a background
//! loader thread (see [`crate::systems::textureloader`]). Loading state is
//! published with release ordering and read with acquire ordering, so a
//! readiness poll on the main thread that observes [`LoadState::Ready`] also
//! observes the dimensions written before it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::thread::JoinHandle;

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Sender, unbounded};
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::error::{Result, SpriteError};
use crate::events::textureload::TextureLoadCmd;
use crate::systems::textureloader::texture_loader_thread;

/// Asynchronous load state of a texture or sprite definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoadState {
    Loading = 0,
    Ready = 1,
    Failed = 2,
}

impl LoadState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => LoadState::Loading,
            1 => LoadState::Ready,
            _ => LoadState::Failed,
        }
    }
}

/// Read-only view of a texture that sprite frames depend on.
pub trait TextureSource: Send + Sync + fmt::Debug {
    /// Name the texture was requested with.
    fn name(&self) -> &str;
    /// Current load state. Must be cheap; it is polled every frame.
    fn load_state(&self) -> LoadState;
    /// Width in pixels. Only meaningful once [`LoadState::Ready`].
    fn width(&self) -> u32;
    /// Height in pixels. Only meaningful once [`LoadState::Ready`].
    fn height(&self) -> u32;
}

/// Shared handle to a frame texture.
pub type TextureHandle = Arc<dyn TextureSource>;

/// Function used to read a texture's pixel dimensions from disk.
pub type TextureDecoder = Arc<dyn Fn(&Path) -> std::result::Result<(u32, u32), String> + Send + Sync>;

/// Texture record whose state can be completed from another thread.
#[derive(Debug)]
pub struct Texture {
    name: String,
    state: AtomicU8,
    width: AtomicU32,
    height: AtomicU32,
}

impl Texture {
    /// Create a texture that is still loading.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AtomicU8::new(LoadState::Loading as u8),
            width: AtomicU32::new(0),
            height: AtomicU32::new(0),
        }
    }

    /// Create a texture that is already loaded.
    pub fn loaded(name: impl Into<String>, width: u32, height: u32) -> Self {
        let texture = Self::pending(name);
        texture.publish(width, height);
        texture
    }

    /// Mark the texture loaded with the given dimensions.
    pub fn publish(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
        self.state.store(LoadState::Ready as u8, Ordering::Release);
    }

    /// Mark the texture as permanently failed.
    pub fn fail(&self) {
        self.state.store(LoadState::Failed as u8, Ordering::Release);
    }
}

impl TextureSource for Texture {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_state(&self) -> LoadState {
        LoadState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }
}

/// Read image dimensions with the `image` crate without decoding pixels.
pub fn image_dimensions(path: &Path) -> std::result::Result<(u32, u32), String> {
    image::image_dimensions(path).map_err(|e| e.to_string())
}

struct TextureLoaderBridge {
    tx_cmd: Sender<TextureLoadCmd>,
    handle: JoinHandle<()>,
}

/// Cache of textures keyed by name, with an optional background loader.
#[derive(Resource)]
pub struct TextureStore {
    root: PathBuf,
    textures: FxHashMap<String, Arc<Texture>>,
    decoder: TextureDecoder,
    loader: Option<TextureLoaderBridge>,
}

impl TextureStore {
    /// Create a store that resolves texture names relative to `root` and
    /// reads dimensions with [`image_dimensions`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_decoder(root, Arc::new(image_dimensions))
    }

    /// Create a store with a custom decoder.
    pub fn with_decoder(root: impl Into<PathBuf>, decoder: TextureDecoder) -> Self {
        Self {
            root: root.into(),
            textures: FxHashMap::default(),
            decoder,
            loader: None,
        }
    }

    /// Spawn the background loader thread. Does nothing if already running.
    pub fn start_loader(&mut self) {
        if self.loader.is_some() {
            return;
        }
        let (tx_cmd, rx_cmd) = unbounded::<TextureLoadCmd>();
        let decoder = Arc::clone(&self.decoder);
        let handle = std::thread::spawn(move || texture_loader_thread(rx_cmd, decoder));
        self.loader = Some(TextureLoaderBridge { tx_cmd, handle });
        info!("Texture loader started");
    }

    /// Ask the loader thread to stop and wait for it.
    ///
    /// Textures still queued stay in [`LoadState::Loading`].
    pub fn shutdown_loader(&mut self) {
        if let Some(bridge) = self.loader.take() {
            let _ = bridge.tx_cmd.send(TextureLoadCmd::Shutdown);
            let _ = bridge.handle.join();
            info!("Texture loader stopped");
        }
    }

    /// Whether a background loader thread is running.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Get or create the texture called `name`.
    ///
    /// A cached texture is returned as-is, whatever its state. Otherwise the
    /// texture is decoded synchronously when `immediate` is set or no loader
    /// is running, and queued on the loader thread when not.
    pub fn request(&mut self, name: &str, immediate: bool) -> Result<TextureHandle> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(Arc::clone(texture) as TextureHandle);
        }

        let path = self.root.join(name);
        let texture = match (&self.loader, immediate) {
            (Some(bridge), false) => {
                let texture = Arc::new(Texture::pending(name));
                let cmd = TextureLoadCmd::Load {
                    path: path.clone(),
                    texture: Arc::clone(&texture),
                };
                if bridge.tx_cmd.send(cmd).is_ok() {
                    texture
                } else {
                    warn!("Texture loader is gone, loading {} synchronously", name);
                    Arc::new(self.decode(name, &path)?)
                }
            }
            _ => Arc::new(self.decode(name, &path)?),
        };

        self.textures.insert(name.to_string(), Arc::clone(&texture));
        Ok(texture as TextureHandle)
    }

    fn decode(&self, name: &str, path: &Path) -> Result<Texture> {
        let (width, height) = (self.decoder)(path).map_err(|reason| SpriteError::Texture {
            name: name.to_string(),
            reason,
        })?;
        Ok(Texture::loaded(name, width, height))
    }

    /// Register an externally created texture, replacing any with the same name.
    pub fn insert(&mut self, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.textures
            .insert(texture.name().to_string(), Arc::clone(&texture));
        texture
    }

    /// Get a cached texture by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Texture>> {
        self.textures.get(name)
    }

    /// Number of textures still loading.
    pub fn pending_count(&self) -> usize {
        self.textures
            .values()
            .filter(|t| t.load_state() == LoadState::Loading)
            .count()
    }

    /// Number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Drop for TextureStore {
    fn drop(&mut self) {
        self.shutdown_loader();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn fixed_decoder() -> TextureDecoder {
        Arc::new(|path: &Path| {
            if path.to_string_lossy().contains("missing") {
                Err("file not found".to_string())
            } else {
                Ok((32, 16))
            }
        })
    }

    fn wait_settled(texture: &TextureHandle) -> LoadState {
        let deadline = Instant::now() + Duration::from_secs(5);
        while texture.load_state() == LoadState::Loading && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        texture.load_state()
    }

    #[test]
    fn test_pending_texture_reports_loading() {
        let t = Texture::pending("a.png");
        assert_eq!(t.load_state(), LoadState::Loading);
        assert_eq!(t.width(), 0);
    }

    #[test]
    fn test_publish_sets_dimensions_and_state() {
        let t = Texture::pending("a.png");
        t.publish(64, 48);
        assert_eq!(t.load_state(), LoadState::Ready);
        assert_eq!((t.width(), t.height()), (64, 48));
    }

    #[test]
    fn test_fail_is_reported() {
        let t = Texture::pending("a.png");
        t.fail();
        assert_eq!(t.load_state(), LoadState::Failed);
    }

    #[test]
    fn test_immediate_request_decodes_synchronously() {
        let mut store = TextureStore::with_decoder("assets", fixed_decoder());
        let tex = store.request("hero.png", true).unwrap();
        assert_eq!(tex.load_state(), LoadState::Ready);
        assert_eq!((tex.width(), tex.height()), (32, 16));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_request_without_loader_is_synchronous() {
        let mut store = TextureStore::with_decoder("assets", fixed_decoder());
        let tex = store.request("hero.png", false).unwrap();
        assert_eq!(tex.load_state(), LoadState::Ready);
    }

    #[test]
    fn test_immediate_decode_failure_is_an_error() {
        let mut store = TextureStore::with_decoder("assets", fixed_decoder());
        let err = store.request("missing.png", true).unwrap_err();
        assert!(matches!(err, SpriteError::Texture { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_cached_request_returns_same_texture() {
        let mut store = TextureStore::with_decoder("assets", fixed_decoder());
        let a = store.request("hero.png", true).unwrap();
        let b = store.request("hero.png", true).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_loader_thread_completes_textures() {
        let mut store = TextureStore::with_decoder("assets", fixed_decoder());
        store.start_loader();
        let ok = store.request("hero.png", false).unwrap();
        let bad = store.request("missing.png", false).unwrap();
        assert_eq!(wait_settled(&ok), LoadState::Ready);
        assert_eq!(wait_settled(&bad), LoadState::Failed);
        assert_eq!(ok.width(), 32);
        assert_eq!(store.pending_count(), 0);
        store.shutdown_loader();
        assert!(!store.has_loader());
    }
}
