use std::path::PathBuf;
use std::sync::Arc;

use crate::resources::texturestore::Texture;

/// Commands sent *to* the texture loader thread
#[derive(Debug)]
pub enum TextureLoadCmd {
    /// Read `path` and complete `texture` with its dimensions, or fail it.
    Load { path: PathBuf, texture: Arc<Texture> },
    Shutdown,
}
