//! Simulation plugins and schedule wiring.
//!
//! ## Schedule
//!
//! | Schedule | Systems (in order) |
//! |----------|--------------------|
//! | `Startup` | `spawn_ropes_system` |
//! | `Update` | input sampling → `hold_transition_system`; `rope_collision_report_system` |
//! | `FixedUpdate` | `payload_arbiter_system` → `lift_wind_system` → `pull_control_system` → `kite_motion_system` |
//! | `FixedPostUpdate` | Rapier step → `lift_report_system` → `segment_count_system` |
//!
//! Force and pose writers run in `FixedUpdate`, ahead of the Rapier step in
//! `FixedPostUpdate`.  The segment count controller reads altitudes after
//! Rapier's writeback and queues topology edits as commands, which land
//! before the next step.
//!
//! Keyboard sampling lives in [`KiteInputPlugin`] so headless tests can drive
//! [`KiteIntent`] directly.

use crate::config::KiteConfig;
use crate::kite::{
    hold_transition_system, intent_clear_system, keyboard_to_intent_system, kite_motion_system,
    lift_report_system, lift_wind_system, payload_arbiter_system, pull_control_system,
    KiteIntent, LiftReport,
};
use crate::rope::{rope_collision_report_system, segment_count_system, RopeCrossing};
use crate::spawner::spawn_ropes_system;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KiteSet {
    /// Frame-rate input sampling into `KiteIntent`.
    Input,
    /// Frame-rate state machine transitions.
    Transitions,
    /// Fixed-step force and pose writers.
    Control,
    /// Post-physics reporting and rope topology edits.
    Tether,
}

pub struct KiteSimPlugin;

impl Plugin for KiteSimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KiteConfig>()
            .init_resource::<KiteIntent>()
            .add_message::<LiftReport>()
            .add_message::<RopeCrossing>()
            .add_message::<CollisionEvent>()
            .configure_sets(Update, KiteSet::Transitions.after(KiteSet::Input))
            .configure_sets(FixedPostUpdate, KiteSet::Tether.after(PhysicsSet::Writeback))
            .add_systems(Startup, spawn_ropes_system)
            .add_systems(
                Update,
                (
                    hold_transition_system.in_set(KiteSet::Transitions),
                    rope_collision_report_system,
                ),
            )
            .add_systems(
                FixedUpdate,
                (
                    payload_arbiter_system,
                    lift_wind_system,
                    pull_control_system,
                    kite_motion_system,
                )
                    .chain()
                    .in_set(KiteSet::Control),
            )
            .add_systems(
                FixedPostUpdate,
                (lift_report_system, segment_count_system)
                    .chain()
                    .in_set(KiteSet::Tether),
            );
    }
}

/// Keyboard → [`KiteIntent`] every frame.
pub struct KiteInputPlugin;

impl Plugin for KiteInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (intent_clear_system, keyboard_to_intent_system)
                .chain()
                .in_set(KiteSet::Input),
        );
    }
}
