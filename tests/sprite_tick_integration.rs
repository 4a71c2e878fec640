//! ECS tick integration tests: playback, clip events and drawing driven by
//! the schedule the way an application runs them.

use std::sync::{Arc, Mutex};

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::Vec2;

use spriteblend::components::animation::AnimationMode;
use spriteblend::components::drawparams::{Color, DrawParams};
use spriteblend::components::sprite::SpriteInstance;
use spriteblend::events::animation::{SpriteAnimationEvent, log_animation_event};
use spriteblend::resources::material::{MaterialSink, MaterialStore};
use spriteblend::resources::spritedefinition::{Clip, SpriteDefinition};
use spriteblend::resources::texturestore::{Texture, TextureHandle, TextureSource};
use spriteblend::resources::worldtime::WorldTime;
use spriteblend::systems::animation::sprite_animation;
use spriteblend::systems::render::render_sprites;
use spriteblend::systems::time::update_world_time;

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn texture(name: &str) -> TextureHandle {
    Arc::new(Texture::loaded(name, 32, 32))
}

/// `walk`: 4 frames of 0.25s with `left` at 0.0 and `right` at 0.5.
/// `idle`: 1 frame of 1.0s.
fn hero() -> Arc<SpriteDefinition> {
    let mut walk = Clip::new("walk", 0.25);
    for i in 0..4 {
        walk.push_frame(texture(&format!("walk{}.png", i)));
    }
    let walk = walk
        .with_event_at("left", 0.0, 1.0)
        .with_event_at("right", 0.5, 2.0);
    let idle = Clip::new("idle", 1.0).with_frame(texture("idle.png"));
    Arc::new(SpriteDefinition::new("hero", vec![walk, idle], Some("walk")).unwrap())
}

fn make_world() -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world
}

fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
}

fn animation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(sprite_animation);
    schedule
}

fn record_events(world: &mut World) -> Arc<Mutex<Vec<(Entity, String, f32)>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_clone = Arc::clone(&received);
    world.add_observer(move |trigger: On<SpriteAnimationEvent>| {
        let event = trigger.event();
        received_clone
            .lock()
            .unwrap()
            .push((event.entity, event.name.clone(), event.value));
    });
    received
}

fn clip_names(world: &World, entity: Entity) -> Vec<(String, AnimationMode)> {
    let sprite = world.get::<SpriteInstance>(entity).unwrap();
    sprite
        .instances()
        .iter()
        .map(|inst| {
            (
                sprite.definition().clip(inst.clip).name().to_string(),
                inst.mode,
            )
        })
        .collect()
}

#[test]
fn clip_events_are_triggered_for_the_entity() {
    let mut world = make_world();
    let received = record_events(&mut world);
    world.add_observer(log_animation_event);
    let entity = world.spawn(SpriteInstance::new(hero())).id();
    let mut schedule = animation_schedule();

    // 0.0 -> 0.3 -> 0.6 -> 0.9 -> wrap to 0.2
    for _ in 0..4 {
        tick(&mut world, &mut schedule, 0.3);
    }

    let received = received.lock().unwrap();
    let names: Vec<&str> = received.iter().map(|(_, name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["left", "right", "left"]);
    assert!(received.iter().all(|(e, _, _)| *e == entity));
    assert_eq!(received[1].2, 2.0);
}

#[test]
fn callback_and_observer_both_see_events() {
    let mut world = make_world();
    let observed = record_events(&mut world);

    let from_callback = Arc::new(Mutex::new(Vec::new()));
    let from_callback_clone = Arc::clone(&from_callback);
    let mut sprite = SpriteInstance::new(hero());
    sprite.set_event_callback(move |name, value| {
        from_callback_clone
            .lock()
            .unwrap()
            .push((name.to_string(), value));
    });
    world.spawn(sprite);

    let mut schedule = animation_schedule();
    tick(&mut world, &mut schedule, 0.6);

    assert_eq!(
        *from_callback.lock().unwrap(),
        vec![("left".to_string(), 1.0), ("right".to_string(), 2.0)]
    );
    assert_eq!(observed.lock().unwrap().len(), 2);
}

#[test]
fn events_only_reach_their_own_entity() {
    let mut world = make_world();
    let received = record_events(&mut world);
    let definition = hero();
    let a = world.spawn(SpriteInstance::new(Arc::clone(&definition))).id();
    let b = world.spawn(SpriteInstance::new(definition)).id();
    world
        .get_mut::<SpriteInstance>(b)
        .unwrap()
        .play("idle", AnimationMode::Loop, 0.0)
        .unwrap();

    let mut schedule = animation_schedule();
    tick(&mut world, &mut schedule, 0.1);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, a);
}

#[test]
fn time_scale_slows_playback() {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(0.5));
    let entity = world.spawn(SpriteInstance::new(hero())).id();
    let mut schedule = animation_schedule();

    tick(&mut world, &mut schedule, 0.2);

    let sprite = world.get::<SpriteInstance>(entity).unwrap();
    assert!(approx_eq(sprite.instances()[0].time, 0.1));
}

#[test]
fn cross_fade_completes_over_transition_time() {
    let mut world = make_world();
    let entity = world.spawn(SpriteInstance::new(hero())).id();
    let mut schedule = animation_schedule();

    world
        .get_mut::<SpriteInstance>(entity)
        .unwrap()
        .play("idle", AnimationMode::Loop, 0.5)
        .unwrap();

    tick(&mut world, &mut schedule, 0.25);
    {
        let sprite = world.get::<SpriteInstance>(entity).unwrap();
        let weights: Vec<f32> = sprite.instances().iter().map(|i| i.weight).collect();
        assert_eq!(weights.len(), 2);
        assert!(approx_eq(weights[0], 0.5));
        assert!(approx_eq(weights[1], 0.5));
    }

    tick(&mut world, &mut schedule, 0.25);
    assert_eq!(
        clip_names(&world, entity),
        vec![("idle".to_string(), AnimationMode::Loop)]
    );
    let sprite = world.get::<SpriteInstance>(entity).unwrap();
    assert_eq!(sprite.instances()[0].weight, 1.0);
}

#[test]
fn queued_clip_runs_after_loop_then_falls_back_to_default() {
    let mut world = make_world();
    let entity = world.spawn(SpriteInstance::new(hero())).id();
    let mut schedule = animation_schedule();

    tick(&mut world, &mut schedule, 0.25);
    world
        .get_mut::<SpriteInstance>(entity)
        .unwrap()
        .play("idle", AnimationMode::OnceWhenDone, 0.0)
        .unwrap();

    // walk keeps looping until its cycle completes at 1.0s.
    tick(&mut world, &mut schedule, 0.25);
    tick(&mut world, &mut schedule, 0.25);
    assert_eq!(
        clip_names(&world, entity),
        vec![
            ("walk".to_string(), AnimationMode::Loop),
            ("idle".to_string(), AnimationMode::OnceWhenDone)
        ]
    );

    tick(&mut world, &mut schedule, 0.25);
    assert_eq!(
        clip_names(&world, entity),
        vec![("idle".to_string(), AnimationMode::Once)]
    );

    // idle plays once, then the default clip takes over.
    for _ in 0..4 {
        tick(&mut world, &mut schedule, 0.25);
    }
    assert_eq!(
        clip_names(&world, entity),
        vec![("walk".to_string(), AnimationMode::Loop)]
    );
}

// --- drawing ---

struct Counting {
    draws: Arc<Mutex<Vec<String>>>,
    technique: String,
}

impl MaterialSink for Counting {
    fn set_color(&mut self, _color: Color) {}
    fn set_technique(&mut self, technique: &str) {
        self.technique = technique.to_string();
    }
    fn bind_texture(&mut self, _slot: &str, _texture: &TextureHandle) {}
    fn set_scalar_param(&mut self, _name: &str, _value: f32) {}
    fn submit(&mut self, _quad: &[Vec2; 4], _uv: &[Vec2; 4]) {
        self.draws.lock().unwrap().push(self.technique.clone());
    }
}

#[test]
fn render_sprites_draws_ready_entities_with_params() {
    let mut world = make_world();
    let pending = Arc::new(Texture::pending("slow.png"));
    let slow = Arc::new(
        SpriteDefinition::new(
            "slow",
            vec![Clip::new("idle", 0.1).with_frame(Arc::clone(&pending) as TextureHandle)],
            None,
        )
        .unwrap(),
    );

    world.spawn((SpriteInstance::new(hero()), DrawParams::default()));
    world.spawn((SpriteInstance::new(slow), DrawParams::default()));
    // No DrawParams: never drawn.
    world.spawn(SpriteInstance::new(hero()));

    let draws = Arc::new(Mutex::new(Vec::new()));
    let mut renderer = MaterialStore::new(Counting {
        draws: Arc::clone(&draws),
        technique: String::new(),
    });

    assert_eq!(render_sprites(&mut world, &mut renderer), 1);
    assert_eq!(*draws.lock().unwrap(), vec!["tex_lerp_col"]);

    pending.publish(16, 16);
    assert_eq!(pending.name(), "slow.png");
    assert_eq!(render_sprites(&mut world, &mut renderer), 2);
    assert_eq!(draws.lock().unwrap().len(), 3);
}

#[test]
fn despawning_releases_the_definition() {
    let mut world = make_world();
    let definition = hero();
    let entity = world.spawn(SpriteInstance::new(Arc::clone(&definition))).id();
    assert_eq!(Arc::strong_count(&definition), 2);

    world.despawn(entity);
    assert_eq!(Arc::strong_count(&definition), 1);
}
