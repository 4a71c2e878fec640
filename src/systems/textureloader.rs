//! Background texture loader.
//!
//! [`texture_loader_thread`] runs on its own OS thread, spawned by
//! [`TextureStore::start_loader`](crate::resources::texturestore::TextureStore::start_loader).
//! It receives [`TextureLoadCmd`] messages over a crossbeam channel, reads
//! each texture's dimensions with the store's decoder and completes the
//! shared [`Texture`](crate::resources::texturestore::Texture) record. The
//! main thread never waits on it; sprite definitions poll the records.

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

use crate::events::textureload::TextureLoadCmd;
use crate::resources::texturestore::{TextureDecoder, TextureSource};

/// Entry point of the dedicated texture loader thread.
///
/// Exits on [`TextureLoadCmd::Shutdown`] or when every sender is dropped.
pub fn texture_loader_thread(rx_cmd: Receiver<TextureLoadCmd>, decoder: TextureDecoder) {
    info!("Texture loader thread running");
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            TextureLoadCmd::Load { path, texture } => match decoder(&path) {
                Ok((width, height)) => {
                    debug!("Texture {} loaded ({}x{})", texture.name(), width, height);
                    texture.publish(width, height);
                }
                Err(reason) => {
                    warn!("Texture {} failed to load: {}", texture.name(), reason);
                    texture.fail();
                }
            },
            TextureLoadCmd::Shutdown => break,
        }
    }
    info!("Texture loader thread exiting");
}
