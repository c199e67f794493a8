//! Kite input and control arbitration.
//!
//! ## Pipeline
//!
//! Every `Update` frame, in order:
//! 1. [`intent_clear_system`] resets [`KiteIntent`].
//! 2. [`keyboard_to_intent_system`] samples Space (hold) and ArrowDown
//!    (thrust / descent) into it.
//! 3. [`hold_transition_system`] turns hold edges into state machine
//!    transitions on the player kite.
//!
//! Every fixed step, before any writer runs, [`payload_arbiter_system`]
//! decides which single controller owns each kite body for the tick.

use super::body::BodyState;
use super::lift::LiftWind;
use super::motion::KiteMotion;
use super::state::{resolve_mode, Kite, KiteIntent, PayloadMode, PlayerKite, Tether};
use super::thrust::PullControl;
use crate::config::KiteConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub const HOLD_KEY: KeyCode = KeyCode::Space;
pub const THRUST_KEY: KeyCode = KeyCode::ArrowDown;

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

pub fn intent_clear_system(mut intent: ResMut<KiteIntent>) {
    *intent = KiteIntent::default();
}

// ── Step 2: Keyboard → Intent ─────────────────────────────────────────────────

pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<KiteIntent>) {
    intent.hold_begin = keys.just_pressed(HOLD_KEY);
    intent.hold_end = keys.just_released(HOLD_KEY);
    intent.hold = keys.pressed(HOLD_KEY);
    intent.thrust = keys.pressed(THRUST_KEY);
}

// ── Step 3: Hold edges → transitions ──────────────────────────────────────────

/// Apply hold-begin / hold-end edges to the player kite.
///
/// A begin edge wins if both arrive in the same frame.  Taking hold cancels
/// any thrust release settling first, so the release drag snapshots the
/// kite's base drag.
pub fn hold_transition_system(
    intent: Res<KiteIntent>,
    mut kites: Query<
        (
            &mut KiteMotion,
            &mut LiftWind,
            &Tether,
            &Transform,
            &mut Velocity,
            &mut Damping,
            Option<&mut PullControl>,
        ),
        With<PlayerKite>,
    >,
    anchors: Query<&Transform, Without<PlayerKite>>,
    config: Res<KiteConfig>,
) {
    if !intent.hold_begin && !intent.hold_end {
        return;
    }
    let Ok((mut motion, mut lift, tether, transform, mut velocity, mut damping, pull)) =
        kites.single_mut()
    else {
        return;
    };

    let mut body = BodyState::read(transform, &velocity, &damping);
    if intent.hold_begin {
        let origin = anchors
            .get(tether.anchor)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO);
        if let Some(mut pull) = pull {
            if pull.cancel(&mut body) {
                debug!("Thrust settling cancelled by hold");
            }
        }
        if motion.begin_hold(&mut lift, &mut body, origin, &mut rand::thread_rng()) {
            debug!("Kite held at {:.2?}", body.position);
        }
    } else if intent.hold_end && motion.end_hold(&mut lift, &mut body, &config) {
        debug!("Kite released at {:.2?}", body.position);
    }
    body.apply_velocity(&mut velocity);
    body.apply_damping(&mut damping);
}

// ── Arbiter ───────────────────────────────────────────────────────────────────

/// Assign each kite its [`PayloadMode`] for this tick.
///
/// Gravity is switched off while the pose is overridden so the integrator
/// does not pull the kite away between overrides.
pub fn payload_arbiter_system(
    mut kites: Query<(&KiteMotion, &mut PayloadMode, &mut GravityScale, Has<PlayerKite>), With<Kite>>,
    intent: Res<KiteIntent>,
    config: Res<KiteConfig>,
) {
    for (motion, mut mode, mut gravity, is_player) in kites.iter_mut() {
        let thrusting = is_player && intent.thrust;
        let next = resolve_mode(motion.is_pose_controlled(), thrusting, config.hold_conflict_policy);
        if *mode != next {
            debug!("Payload mode {:?} -> {:?}", *mode, next);
            *mode = next;
        }

        let scale = if next == PayloadMode::Orbiting { 0.0 } else { 1.0 };
        if gravity.0 != scale {
            gravity.0 = scale;
        }
    }
}
