//! Headless integration tests: spawn ropes through the real startup system and
//! drive the tether controllers with `MinimalPlugins` (no window, no Rapier
//! pipeline).  Altitudes are set by moving the kite `Transform` directly.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use patang::config::KiteConfig;
use patang::kite::{
    lift_report_system, Kite, KiteIntent, KiteMotion, LiftReport, LiftWind, MotionState,
    PlayerKite,
};
use patang::rope::{segment_count_system, HeightMonitor, Rope, RopeSegment};
use patang::simulation::KiteSimPlugin;
use patang::spawner::spawn_ropes_system;

fn tether_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(KiteConfig::default());
    app.add_message::<LiftReport>();
    app.add_systems(Startup, spawn_ropes_system);
    app.add_systems(Update, (lift_report_system, segment_count_system).chain());
    app
}

fn kite_entity(app: &mut App) -> Entity {
    let mut q = app.world_mut().query_filtered::<Entity, With<Kite>>();
    q.single(app.world()).expect("exactly one kite")
}

fn rope_entity(app: &mut App) -> Entity {
    let mut q = app.world_mut().query_filtered::<Entity, With<Rope>>();
    q.single(app.world()).expect("exactly one rope")
}

fn set_kite(app: &mut App, altitude: f32, lift: f32) {
    let kite = kite_entity(app);
    let mut entity = app.world_mut().entity_mut(kite);
    entity.insert(LiftWind::new(lift, 0.0));
    entity.get_mut::<Transform>().unwrap().translation.y = altitude;
}

#[test]
fn startup_builds_three_segments_and_a_kite() {
    let mut app = tether_app();
    app.update();

    let mut q = app
        .world_mut()
        .query::<(&RopeSegment, &Transform, &ImpulseJoint)>();
    let mut heights: Vec<(usize, f32)> = q
        .iter(app.world())
        .map(|(seg, t, _)| (seg.index, t.translation.y))
        .collect();
    heights.sort_by_key(|(i, _)| *i);
    let heights: Vec<f32> = heights.into_iter().map(|(_, y)| y).collect();
    assert_eq!(heights.len(), 3);
    for (actual, expected) in heights.iter().zip([0.3, 0.6, 0.9]) {
        assert!((actual - expected).abs() < 1e-5, "segment at {actual}");
    }

    let kite = kite_entity(&mut app);
    let world = app.world();
    let kite_y = world.get::<Transform>(kite).unwrap().translation.y;
    assert!((kite_y - 1.14).abs() < 1e-4, "kite at {kite_y}");
    assert!(world.get::<PlayerKite>(kite).is_some());

    let rope = rope_entity(&mut app);
    let world = app.world();
    let rope = world.get::<Rope>(rope).unwrap();
    assert_eq!(rope.segment_count(), 3);
    assert_eq!(rope.payload(), Some(kite));
    let tail = *rope.segments().last().unwrap();
    assert_eq!(world.get::<ImpulseJoint>(kite).unwrap().parent, tail);
}

#[test]
fn climbing_one_step_adds_one_segment_and_repoints_the_kite() {
    let mut app = tether_app();
    app.update(); // startup + reference recorded at spawn altitude

    let rope = rope_entity(&mut app);
    let start = app.world().get::<HeightMonitor>(rope).unwrap().reference().unwrap();
    assert!((start - 1.14).abs() < 1e-4);

    set_kite(&mut app, start + 10.05, 50.0);
    app.update();

    let world = app.world();
    let rope_component = world.get::<Rope>(rope).unwrap();
    assert_eq!(rope_component.segment_count(), 4);
    let reference = world.get::<HeightMonitor>(rope).unwrap().reference().unwrap();
    assert!((reference - (start + 10.0)).abs() < 1e-4);

    let tail = *rope_component.segments().last().unwrap();
    let kite = rope_component.payload().unwrap();
    assert_eq!(world.get::<ImpulseJoint>(kite).unwrap().parent, tail);
    let tail_y = world.get::<Transform>(tail).unwrap().translation.y;
    assert!((tail_y - 1.2).abs() < 1e-5);
}

#[test]
fn exhausted_capacity_adds_nothing_but_advances_reference() {
    let mut app = tether_app();
    app.update();

    let rope = rope_entity(&mut app);
    let start = app.world().get::<HeightMonitor>(rope).unwrap().reference().unwrap();
    // capacity 2 against a 3-segment rope, three steps of climb
    set_kite(&mut app, start + 30.0, 20.0);
    app.update();

    let world = app.world();
    assert_eq!(world.get::<Rope>(rope).unwrap().segment_count(), 3);
    let reference = world.get::<HeightMonitor>(rope).unwrap().reference().unwrap();
    assert!((reference - (start + 30.0)).abs() < 1e-4);
}

#[test]
fn monitor_without_rope_goes_inert() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(KiteConfig::default());
    app.add_message::<LiftReport>();
    app.add_systems(Update, segment_count_system);

    let orphan = app.world_mut().spawn(HeightMonitor::default()).id();
    let kite = app.world_mut().spawn_empty().id();
    for _ in 0..2 {
        app.world_mut().write_message(LiftReport {
            rope: orphan,
            kite,
            altitude: 50.0,
            lift: 100.0,
            capacity: 10,
        });
        app.update();
    }

    let monitor = app.world().get::<HeightMonitor>(orphan).unwrap();
    assert!(monitor.is_inert());
    assert_eq!(monitor.reference(), None);
}

#[test]
fn sim_plugin_spawns_and_holds_the_player_kite() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(KiteSimPlugin);
    app.update();

    let kite = kite_entity(&mut app);
    app.world_mut().resource_mut::<KiteIntent>().hold_begin = true;
    app.update();

    let world = app.world();
    assert_eq!(world.get::<KiteMotion>(kite).unwrap().state(), MotionState::Held);
    assert!(world.get::<LiftWind>(kite).unwrap().is_held());
}

#[test]
fn rival_spawn_points_get_their_own_rope() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    let mut config = KiteConfig::default();
    config.spawn_points.push(patang::config::SpawnPoint {
        position: [6.0, 0.0, 0.0],
        owner: patang::rope::RopeOwner::Rival,
    });
    app.insert_resource(config);
    app.add_systems(Startup, spawn_ropes_system);
    app.update();

    let mut ropes = app.world_mut().query::<&Rope>();
    assert_eq!(ropes.iter(app.world()).count(), 2);
    let mut players = app.world_mut().query_filtered::<Entity, With<PlayerKite>>();
    assert_eq!(players.iter(app.world()).count(), 1);
    let mut kites = app.world_mut().query_filtered::<&Transform, With<Kite>>();
    let mut xs: Vec<f32> = kites.iter(app.world()).map(|t| t.translation.x).collect();
    xs.sort_by(f32::total_cmp);
    assert_eq!(xs, vec![0.0, 6.0]);
}
