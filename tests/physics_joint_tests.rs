//! Tether joints checked against Rapier's own joint set.
//!
//! These run the physics pipeline headless (`MinimalPlugins` + `TransformPlugin`
//! + `RapierPhysicsPlugin`) and compare the body a joint really hangs from with
//! the body handle of the rope's current tail.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::dynamics::RigidBodyHandle;
use patang::config::KiteConfig;
use patang::rope::{CommandsBackend, Rope};
use patang::spawner::spawn_ropes_system;

fn physics_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default(),
    ));
    app.insert_resource(KiteConfig::default());
    app.add_systems(Startup, spawn_ropes_system);
    app.finish();
    step(&mut app);
    app
}

fn step(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

fn grow_by_one(
    mut commands: Commands,
    mut ropes: Query<(Entity, &mut Rope)>,
    transforms: Query<&Transform>,
    config: Res<KiteConfig>,
) {
    for (entity, mut rope) in &mut ropes {
        let mut backend = CommandsBackend::new(&mut commands, entity, &config, |e| {
            transforms.get(e).ok().map(|t| t.translation)
        });
        rope.append_segment(&mut backend).expect("append succeeds");
    }
}

fn shrink_by_one(
    mut commands: Commands,
    mut ropes: Query<(Entity, &mut Rope)>,
    transforms: Query<&Transform>,
    config: Res<KiteConfig>,
) {
    for (entity, mut rope) in &mut ropes {
        let mut backend = CommandsBackend::new(&mut commands, entity, &config, |e| {
            transforms.get(e).ok().map(|t| t.translation)
        });
        rope.remove_last_segment(&mut backend).expect("remove succeeds");
    }
}

/// The rope's tail and kite as Rapier bodies.
fn tail_and_kite(app: &mut App) -> (RigidBodyHandle, RigidBodyHandle, Entity) {
    let world = app.world_mut();
    let mut ropes = world.query::<&Rope>();
    let rope = ropes.single(world).expect("exactly one rope");
    let tail = *rope.segments().last().expect("rope has segments");
    let kite = rope.payload().expect("rope has a kite");
    let body = |e: Entity| {
        world
            .get::<RapierRigidBodyHandle>(e)
            .expect("body registered with rapier")
            .0
    };
    (body(tail), body(kite), kite)
}

/// `(body1, body2)` of the joint Rapier holds for `child`, if any.
fn rapier_joint_bodies(app: &mut App, child: Entity) -> Option<(RigidBodyHandle, RigidBodyHandle)> {
    let world = app.world_mut();
    let handle = world.get::<RapierImpulseJointHandle>(child)?.0;
    let mut contexts = world.query::<&RapierContextJoints>();
    let joints = contexts.single(world).expect("one rapier context");
    joints
        .impulse_joints
        .get(handle)
        .map(|joint| (joint.body1, joint.body2))
}

fn rapier_joint_count(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut contexts = world.query::<&RapierContextJoints>();
    contexts
        .single(world)
        .expect("one rapier context")
        .impulse_joints
        .len()
}

#[test]
fn built_rope_hangs_the_kite_from_the_tail_in_rapier() {
    let mut app = physics_app();

    let (tail, kite_body, kite) = tail_and_kite(&mut app);
    assert_eq!(rapier_joint_bodies(&mut app, kite), Some((tail, kite_body)));
    // three segments plus the kite
    assert_eq!(rapier_joint_count(&mut app), 4);
}

#[test]
fn growing_moves_the_rapier_joint_to_the_new_tail() {
    let mut app = physics_app();
    let (old_tail, _, _) = tail_and_kite(&mut app);

    app.world_mut()
        .run_system_once(grow_by_one)
        .expect("grow system runs");
    step(&mut app);

    let (tail, kite_body, kite) = tail_and_kite(&mut app);
    assert_ne!(tail, old_tail);
    assert_eq!(rapier_joint_bodies(&mut app, kite), Some((tail, kite_body)));
    assert_eq!(rapier_joint_count(&mut app), 5);
}

#[test]
fn shrinking_keeps_the_kite_jointed_to_the_remaining_tail() {
    let mut app = physics_app();

    app.world_mut()
        .run_system_once(shrink_by_one)
        .expect("shrink system runs");
    step(&mut app);

    let (tail, kite_body, kite) = tail_and_kite(&mut app);
    assert_eq!(rapier_joint_bodies(&mut app, kite), Some((tail, kite_body)));
    assert_eq!(rapier_joint_count(&mut app), 3);
}
