//! Pull-to-dive thrust.
//!
//! While the thrust key is down the kite's velocity is steered toward its
//! face direction at a bounded acceleration.  Letting go starts a short
//! settling phase so the kite does not spring back along the line:
//!
//! 1. linear drag is raised by `thrust_release_extra_damping`;
//! 2. optionally, the velocity component pointing back against the face is
//!    stripped by `backward_strip_strength`;
//! 3. over `thrust_release_fade` seconds, spin and vertical speed are blended
//!    toward zero;
//! 4. after `thrust_release_damping_duration` seconds the original drag is
//!    put back, exactly once.
//!
//! Settling is cancelled, with the original drag put back, as soon as the
//! hold state machine takes the pose over.  Its own release drag then
//! snapshots the base value instead of the raised one.

use super::body::{euler_degrees, move_towards, BodyState};
use super::state::{Kite, KiteIntent, PayloadMode, PlayerKite};
use crate::config::KiteConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Per-kite thrust state.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PullControl {
    was_thrusting: bool,
    /// Seconds into the post-release fade, while it runs.
    fade_elapsed: Option<f32>,
    drag_elapsed: f32,
    /// Linear drag to restore once the drag window closes.
    saved_linear_damping: Option<f32>,
}

impl PullControl {
    pub fn is_settling(&self) -> bool {
        self.fade_elapsed.is_some() || self.saved_linear_damping.is_some()
    }

    /// Drop any release settling in progress and put back the drag it raised.
    ///
    /// Returns `true` if there was anything to drop.
    pub fn cancel(&mut self, body: &mut BodyState) -> bool {
        let active = self.was_thrusting || self.is_settling();
        if let Some(saved) = self.saved_linear_damping.take() {
            body.linear_damping = saved;
        }
        self.was_thrusting = false;
        self.fade_elapsed = None;
        self.drag_elapsed = 0.0;
        active
    }

    /// One fixed step.
    pub fn tick(&mut self, thrusting: bool, body: &mut BodyState, dt: f32, config: &KiteConfig) {
        if thrusting {
            self.fade_elapsed = None;
            self.was_thrusting = true;
            // Thrust resumed inside the drag window: drop the extra drag now
            // so the next release saves the real base value.
            if let Some(saved) = self.saved_linear_damping.take() {
                body.linear_damping = saved;
            }

            let target = face_direction(body.rotation, config) * config.thrust_speed;
            body.linvel = move_towards(body.linvel, target, config.thrust_accel * dt);
            body.angvel = Vec3::ZERO;
            return;
        }

        if self.was_thrusting {
            self.was_thrusting = false;
            self.saved_linear_damping = Some(body.linear_damping);
            body.linear_damping += config.thrust_release_extra_damping;
            self.drag_elapsed = 0.0;
            self.fade_elapsed = Some(0.0);

            if config.strip_backward_on_release {
                let face = face_direction(body.rotation, config);
                body.linvel = strip_backward(body.linvel, face, config.backward_strip_strength);
            }
        }

        if let Some(elapsed) = self.fade_elapsed {
            let elapsed = elapsed + dt;
            let t = if config.thrust_release_fade > 0.0 {
                (elapsed / config.thrust_release_fade).clamp(0.0, 1.0)
            } else {
                1.0
            };
            body.angvel = body.angvel.lerp(Vec3::ZERO, t);
            let level = Vec3::new(body.linvel.x, 0.0, body.linvel.z);
            body.linvel = body.linvel.lerp(level, t * config.vertical_fade_factor);

            self.fade_elapsed = (elapsed < config.thrust_release_fade).then_some(elapsed);
        }

        if let Some(saved) = self.saved_linear_damping {
            self.drag_elapsed += dt;
            if self.drag_elapsed >= config.thrust_release_damping_duration {
                body.linear_damping = saved;
                self.saved_linear_damping = None;
            }
        }
    }
}

/// World-space direction the kite faces: its local forward (-Z) after the
/// configured face offset.
///
/// Both the offset and the rest pose go through [`euler_degrees`], so with the
/// default tuning a kite at rest faces straight up.
pub fn face_direction(rotation: Quat, config: &KiteConfig) -> Vec3 {
    ((rotation * euler_degrees(config.face_offset_deg)) * Vec3::NEG_Z).normalize_or_zero()
}

/// Remove `strength` of the part of `velocity` pointing against `face`.
///
/// Velocity with no backward component is returned unchanged.
pub fn strip_backward(velocity: Vec3, face: Vec3, strength: f32) -> Vec3 {
    let backward = -face.normalize_or_zero();
    let component = velocity.dot(backward);
    if component > 0.0 {
        velocity - backward * component * strength
    } else {
        velocity
    }
}

/// Apply thrust for the player kite while the arbiter grants it control, and
/// run the release settling for every kite outside `Orbiting`.
pub fn pull_control_system(
    mut q: Query<
        (
            &mut PullControl,
            &PayloadMode,
            &Transform,
            &mut Velocity,
            &mut Damping,
            Has<PlayerKite>,
        ),
        With<Kite>,
    >,
    intent: Res<KiteIntent>,
    time: Res<Time>,
    config: Res<KiteConfig>,
) {
    let dt = time.delta_secs();
    for (mut pull, mode, transform, mut velocity, mut damping, is_player) in q.iter_mut() {
        if *mode == PayloadMode::Orbiting {
            if pull.was_thrusting || pull.is_settling() {
                let mut body = BodyState::read(transform, &velocity, &damping);
                pull.cancel(&mut body);
                body.apply_damping(&mut damping);
            }
            continue;
        }

        let thrusting = is_player && intent.thrust && *mode == PayloadMode::ThrustControlled;
        if !thrusting && !pull.was_thrusting && !pull.is_settling() {
            continue;
        }

        let mut body = BodyState::read(transform, &velocity, &damping);
        pull.tick(thrusting, &mut body, dt, &config);
        body.apply_velocity(&mut velocity);
        body.apply_damping(&mut damping);
    }
}
