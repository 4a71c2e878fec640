//! Spriteblend command-line driver.
//!
//! Loads one sprite, plays a clip on it and runs the ECS schedule for a
//! fixed number of ticks. Nothing is rasterised: every draw goes through a
//! material that logs the technique, textures and blend factor it was
//! given, which makes the driver handy for checking definition files.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --sprite hero --clip walk --transition 0.25
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::{Parser, ValueEnum};
use glam::Vec2;
use log::{debug, info, warn};

use spriteblend::components::animation::AnimationMode;
use spriteblend::components::drawparams::{Color, DrawParams};
use spriteblend::components::sprite::SpriteInstance;
use spriteblend::events::animation::log_animation_event;
use spriteblend::resources::material::{MaterialSink, MaterialStore};
use spriteblend::resources::spriteconfig::SpriteConfig;
use spriteblend::resources::spritestore::SpriteStore;
use spriteblend::resources::texturestore::{TextureHandle, TextureStore};
use spriteblend::resources::worldtime::WorldTime;
use spriteblend::systems::animation::sprite_animation;
use spriteblend::systems::render::render_sprites;
use spriteblend::systems::time::update_world_time;

/// Spriteblend playback tracer
#[derive(Parser)]
#[command(version, about = "Play a sprite clip and trace the frames it would draw.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./sprites.ini")]
    config: PathBuf,

    /// Sprite to load: a definition name, or a texture file name.
    #[arg(long)]
    sprite: String,

    /// Clip to play. Empty plays the default clip.
    #[arg(long, default_value = "")]
    clip: String,

    #[arg(long, value_enum, default_value_t = ModeArg::Loop)]
    mode: ModeArg,

    /// Cross-fade time in seconds.
    #[arg(long, default_value_t = 0.0)]
    transition: f32,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Load textures synchronously.
    #[arg(long)]
    immediate: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Loop,
    Once,
    OnceAndFreeze,
    OnceWhenDone,
    LoopWhenDone,
}

impl From<ModeArg> for AnimationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Loop => AnimationMode::Loop,
            ModeArg::Once => AnimationMode::Once,
            ModeArg::OnceAndFreeze => AnimationMode::OnceAndFreeze,
            ModeArg::OnceWhenDone => AnimationMode::OnceWhenDone,
            ModeArg::LoopWhenDone => AnimationMode::LoopWhenDone,
        }
    }
}

/// Material that logs each submitted draw instead of rendering it.
struct LoggingMaterial {
    name: String,
    pending: String,
    submitted: usize,
}

impl LoggingMaterial {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: String::new(),
            submitted: 0,
        }
    }
}

impl MaterialSink for LoggingMaterial {
    fn set_color(&mut self, color: Color) {
        self.pending.clear();
        let _ = write!(self.pending, "color {:?}", color.to_array());
    }

    fn set_technique(&mut self, technique: &str) {
        let _ = write!(self.pending, " technique {}", technique);
    }

    fn bind_texture(&mut self, slot: &str, texture: &TextureHandle) {
        let _ = write!(self.pending, " {}={}", slot, texture.name());
    }

    fn set_scalar_param(&mut self, name: &str, value: f32) {
        let _ = write!(self.pending, " {}={:.3}", name, value);
    }

    fn submit(&mut self, quad: &[Vec2; 4], _uv: &[Vec2; 4]) {
        self.submitted += 1;
        info!(
            "[{}] draw #{}: {} at ({:.1}, {:.1})",
            self.name, self.submitted, self.pending, quad[0].x, quad[0].y
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = SpriteConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}, using defaults", e);
    }

    let mut textures = TextureStore::new(&config.asset_root);
    if config.async_loading {
        textures.start_loader();
    }

    // Failures are logged by the store.
    let mut sprites = SpriteStore::new();
    let Ok(mut sprite) = sprites.create(&cli.sprite, cli.immediate, &config, &mut textures) else {
        std::process::exit(1);
    };
    if sprite.play(&cli.clip, cli.mode.into(), cli.transition).is_err() {
        std::process::exit(1);
    }
    sprite.set_event_callback(|name, value| info!("Event '{}' = {}", name, value));

    let mut renderer = MaterialStore::new(LoggingMaterial::new("default"));
    if let Some(material) = sprite.definition().material() {
        renderer.insert(material, LoggingMaterial::new(material));
    }

    // --------------- ECS world ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    let entity = world.spawn((sprite, DrawParams::from_config(&config))).id();
    world.spawn(Observer::new(log_animation_event));
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(sprite_animation);

    // --------------- Tick loop ---------------
    for tick in 0..cli.ticks {
        update_world_time(&mut world, cli.dt);
        update.run(&mut world);

        if render_sprites(&mut world, &mut renderer) == 0 {
            debug!("Tick {}: {} not ready yet", tick, cli.sprite);
        }
    }

    if let Some(sprite) = world.get::<SpriteInstance>(entity) {
        info!(
            "Finished {} ticks ({:.3}s): {:?}",
            cli.ticks,
            world.resource::<WorldTime>().elapsed,
            sprite.instances()
        );
    }

    drop(world);
    textures.shutdown_loader();
}
