//! Kite module: the payload body at the end of every rope and the controllers
//! that fly it.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Components (`Kite`, `PlayerKite`, `Tether`, `PayloadMode`) and the `KiteIntent` resource |
//! | [`body`] | `BodyState` snapshot plus pose helpers shared by the controllers |
//! | [`lift`] | Lift/wind ramp, lift force, `LiftReport` publishing |
//! | [`motion`] | Hold / orbit / release state machine |
//! | [`thrust`] | Thrust toward the face direction and release settling |
//! | [`control`] | Keyboard sampling, hold transitions, payload-mode arbiter |
//!
//! All public items are re-exported at this level.

pub mod body;
pub mod control;
pub mod lift;
pub mod motion;
pub mod state;
pub mod thrust;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use body::{euler_degrees, move_towards, rotate_towards, BodyState};
pub use control::{
    hold_transition_system, intent_clear_system, keyboard_to_intent_system,
    payload_arbiter_system, HOLD_KEY, THRUST_KEY,
};
pub use lift::{lift_report_system, lift_wind_system, segment_capacity, LiftReport, LiftWind};
pub use motion::{kite_motion_system, orbit_point, orbit_radius, KiteMotion, MotionState};
pub use state::{resolve_mode, Kite, KiteIntent, PayloadMode, PlayerKite, Tether};
pub use thrust::{face_direction, pull_control_system, strip_backward, PullControl};

// ── Kite spawn ────────────────────────────────────────────────────────────────

use crate::config::KiteConfig;
use crate::rope::PayloadTemplate;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Spawn a kite body for `rope` at `position`.
///
/// The joint to the rope tail is added separately by the rope.  Gravity is
/// on; the kite climbs only once lift outgrows its weight plus the rope's.
pub fn spawn_kite(
    commands: &mut Commands,
    rope: Entity,
    anchor: Entity,
    template: &PayloadTemplate,
    position: Vec3,
    config: &KiteConfig,
) -> Entity {
    let id = commands
        .spawn((
            (
                Kite,
                Name::new("Kite"),
                Tether { rope, anchor },
                LiftWind::new(config.initial_lift, config.initial_wind),
                KiteMotion::new(template.rest_rotation),
                PullControl::default(),
                PayloadMode::default(),
            ),
            (
                RigidBody::Dynamic,
                Collider::cuboid(
                    template.half_extents.x,
                    template.half_extents.y,
                    template.half_extents.z,
                ),
                ColliderMassProperties::Mass(template.mass),
                Velocity::zero(),
                ExternalForce::default(),
                Damping {
                    linear_damping: config.kite_linear_damping,
                    angular_damping: config.kite_angular_damping,
                },
                GravityScale(1.0),
                Ccd::enabled(),
                Transform::from_translation(position).with_rotation(template.rest_rotation),
            ),
        ))
        .id();

    info!("Kite spawned at {:.2?}", position);
    id
}
