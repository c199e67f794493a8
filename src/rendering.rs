//! Rendering: rope polylines, kite outlines, camera and light.
//!
//! Everything here is drawn with immediate-mode gizmos from the physics
//! state; nothing in the simulation reads back from rendering.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `setup_camera` | Startup | Spawn the 3D camera and a sun light |
//! | `rope_gizmo_system` | Update | Draw each rope from `Rope::snapshot` |
//! | `kite_gizmo_system` | Update | Draw each kite as a diamond |
//! | `camera_follow_system` | Update | Keep the player kite in view |

use crate::config::KiteConfig;
use crate::kite::{Kite, KiteMotion, MotionState, PlayerKite};
use crate::rope::{Rope, RopeOwner};
use bevy::prelude::*;

const CAMERA_OFFSET: Vec3 = Vec3::new(-18.0, 6.0, 0.0);

pub struct KiteRenderingPlugin;

impl Plugin for KiteRenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera).add_systems(
            Update,
            (rope_gizmo_system, kite_gizmo_system, camera_follow_system),
        );
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_OFFSET + Vec3::Y * 4.0).looking_at(Vec3::Y * 4.0, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    info!("Camera spawned");
}

/// Draw every rope as a polyline from its anchor through the kite.
pub fn rope_gizmo_system(
    mut gizmos: Gizmos,
    ropes: Query<(&Rope, Option<&RopeOwner>)>,
    transforms: Query<&GlobalTransform>,
) {
    for (rope, owner) in ropes.iter() {
        let points = rope.snapshot(|e| transforms.get(e).ok().map(|t| t.translation()));
        if points.len() < 2 {
            continue;
        }
        let color = match owner.copied().unwrap_or_default() {
            RopeOwner::Player => Color::srgb(0.95, 0.95, 0.9),
            RopeOwner::Rival => Color::srgb(0.9, 0.4, 0.3),
        };
        gizmos.linestrip(points, color);
    }
}

/// Draw every kite as a diamond in its local XY plane, tinted by state.
pub fn kite_gizmo_system(
    mut gizmos: Gizmos,
    kites: Query<(&GlobalTransform, &KiteMotion, Has<PlayerKite>), With<Kite>>,
    config: Res<KiteConfig>,
) {
    let [hx, hy, _] = config.kite_half_extents;
    let corners = [
        Vec3::new(hx, 0.0, 0.0),
        Vec3::new(0.0, hy, 0.0),
        Vec3::new(-hx, 0.0, 0.0),
        Vec3::new(0.0, -hy, 0.0),
        Vec3::new(hx, 0.0, 0.0),
    ];

    for (transform, motion, is_player) in kites.iter() {
        let color = match (motion.state(), is_player) {
            (MotionState::Held, _) => Color::srgb(1.0, 0.85, 0.2),
            (MotionState::Releasing, _) => Color::srgb(0.4, 0.9, 1.0),
            (MotionState::Free, true) => Color::srgb(1.0, 0.3, 0.5),
            (MotionState::Free, false) => Color::srgb(0.6, 0.6, 0.6),
        };
        gizmos.linestrip(corners.iter().map(|c| transform.transform_point(*c)), color);
        // spine
        gizmos.line(
            transform.transform_point(corners[1]),
            transform.transform_point(corners[3]),
            color,
        );
    }
}

/// Keep the camera at a fixed offset from the player kite, looking at it.
pub fn camera_follow_system(
    q_kite: Query<&Transform, With<PlayerKite>>,
    mut q_camera: Query<&mut Transform, (With<Camera>, Without<PlayerKite>)>,
) {
    let Ok(kite) = q_kite.single() else {
        return;
    };
    let Ok(mut cam) = q_camera.single_mut() else {
        return;
    };

    let focus = kite.translation * 0.5;
    *cam = Transform::from_translation(focus + CAMERA_OFFSET).looking_at(focus, Vec3::Y);
}
