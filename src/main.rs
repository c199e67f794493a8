use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;

use patang::config::{self, KiteConfig};
use patang::rendering::KiteRenderingPlugin;
use patang::simulation::{KiteInputPlugin, KiteSimPlugin};
use patang::spawner;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Patang".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.55, 0.75, 0.95)))
        // Compiled defaults; load_kite_config overwrites them from
        // assets/kite.toml (if present) before anything is spawned.
        .insert_resource(KiteConfig::default())
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins((KiteSimPlugin, KiteInputPlugin, KiteRenderingPlugin))
        .add_systems(
            Startup,
            config::load_kite_config.before(spawner::spawn_ropes_system),
        )
        .run();
}
