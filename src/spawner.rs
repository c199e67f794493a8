//! Startup spawning of anchors, ropes and kites from `spawn_points`.

use crate::config::KiteConfig;
use crate::kite::PlayerKite;
use crate::rope::{CommandsBackend, HeightMonitor, Rope, RopeAnchor, RopeOwner};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Spawn one anchored rope per configured spawn point.
///
/// Each spawn point gets a fixed anchor body and a rope entity carrying the
/// [`Rope`], its [`HeightMonitor`] and its [`RopeOwner`].  The first
/// `Player` kite is tagged [`PlayerKite`] and answers to the keyboard; all
/// other kites fly on lift alone.
pub fn spawn_ropes_system(mut commands: Commands, config: Res<KiteConfig>) {
    let mut player_assigned = false;

    for (i, point) in config.spawn_points.iter().enumerate() {
        let position = Vec3::from_array(point.position);
        let anchor = commands
            .spawn((
                RopeAnchor,
                Name::new(format!("Anchor {i}")),
                RigidBody::Fixed,
                Transform::from_translation(position),
            ))
            .id();
        let rope_entity = commands
            .spawn((
                Name::new(format!("Rope {i}")),
                HeightMonitor::default(),
                point.owner,
            ))
            .id();

        let mut rope = Rope::from_config(Some(anchor), &config);
        let built = {
            let mut backend = CommandsBackend::new(&mut commands, rope_entity, &config, |_| None)
                .with_known_position(anchor, position);
            rope.build(&mut backend, config.initial_segment_count)
        };

        match built {
            Ok(kite) => {
                if point.owner == RopeOwner::Player && !player_assigned {
                    commands.entity(kite).insert(PlayerKite);
                    player_assigned = true;
                }
                info!(
                    "Rope {i} ({:?}) anchored at {:.2?} with {} segments",
                    point.owner,
                    position,
                    rope.segment_count()
                );
            }
            Err(e) => error!("Rope {i} could not be built: {e}"),
        }
        commands.entity(rope_entity).insert(rope);
    }

    if !player_assigned {
        warn!("No player spawn point configured; keyboard input has no kite to fly");
    }
}
