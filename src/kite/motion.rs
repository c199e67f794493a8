//! Hold / orbit / release state machine.
//!
//! ## States
//!
//! - **Free**: physics flies the kite.
//! - **Held**: the line is held; the kite circles the anchor at its current
//!   altitude and spins about its local X axis.
//! - **Releasing**: the line was let go; for `release_damping_duration`
//!   seconds the kite is pinned near where it was released under heavy drag,
//!   while its orientation turns back toward rest.
//!
//! Transitions are edge-triggered from the frame update
//! ([`super::control::hold_transition_system`]); per-tick behaviour runs in
//! the fixed step ([`kite_motion_system`]).

use super::body::{rotate_towards, BodyState};
use super::lift::LiftWind;
use super::state::{Kite, KiteIntent, PayloadMode, PlayerKite, Tether};
use crate::config::KiteConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Free,
    Held,
    Releasing,
}

/// Per-kite hold/orbit/release state.
#[derive(Component, Debug, Clone)]
pub struct KiteMotion {
    held: bool,
    orbit_angle: f32,
    orbit_sign: f32,
    spin_sign: f32,
    rest_rotation: Quat,
    returning: bool,
    release_timer: f32,
    release_anchor: Vec3,
    /// Damping to put back when the release window closes.
    saved_damping: Option<(f32, f32)>,
}

impl KiteMotion {
    pub fn new(rest_rotation: Quat) -> Self {
        Self {
            held: false,
            orbit_angle: 0.0,
            orbit_sign: 1.0,
            spin_sign: 1.0,
            rest_rotation,
            returning: false,
            release_timer: 0.0,
            release_anchor: Vec3::ZERO,
            saved_damping: None,
        }
    }

    /// `Releasing` lasts while the damping window is open or the
    /// orientation has not yet snapped back to rest.
    pub fn state(&self) -> MotionState {
        if self.held {
            MotionState::Held
        } else if self.release_timer > 0.0 || self.returning {
            MotionState::Releasing
        } else {
            MotionState::Free
        }
    }

    /// Held, or pinned inside the release window.  While this is true the
    /// state machine owns the kite's position.
    pub fn is_pose_controlled(&self) -> bool {
        self.held || self.release_timer > 0.0
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    /// Free/Releasing → Held.  Returns `false` if already held.
    pub fn begin_hold(
        &mut self,
        lift: &mut LiftWind,
        body: &mut BodyState,
        origin: Vec3,
        rng: &mut impl Rng,
    ) -> bool {
        if self.held {
            return false;
        }
        if self.release_timer > 0.0 {
            self.release_timer = 0.0;
            self.restore_damping(body);
        }

        self.held = true;
        self.returning = false;
        lift.set_held(true, body);

        self.orbit_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.spin_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        let to_kite = body.position - origin;
        self.orbit_angle = to_kite.z.atan2(to_kite.x);
        body.linvel.y = 0.0;
        true
    }

    /// Held → Releasing.  Returns `false` if not held.
    pub fn end_hold(&mut self, lift: &mut LiftWind, body: &mut BodyState, config: &KiteConfig) -> bool {
        if !self.held {
            return false;
        }
        self.held = false;
        lift.set_held(false, body);

        self.returning = true;
        self.release_anchor = body.position;
        body.linvel = Vec3::ZERO;
        body.angvel = Vec3::ZERO;

        if config.release_damping_duration > 0.0 {
            self.release_timer = config.release_damping_duration;
            if self.saved_damping.is_none() {
                self.saved_damping = Some((body.linear_damping, body.angular_damping));
            }
            body.linear_damping = config.release_linear_damping;
            body.angular_damping = config.release_angular_damping;
        }
        true
    }

    /// One fixed step.  `suspend_return` pauses only the turn back to rest.
    pub fn tick(
        &mut self,
        body: &mut BodyState,
        origin: Vec3,
        dt: f32,
        config: &KiteConfig,
        suspend_return: bool,
    ) {
        if self.held {
            self.orbit(body, origin, dt, config);
            return;
        }

        if self.release_timer > 0.0 {
            body.position = body
                .position
                .lerp(self.release_anchor, config.release_position_lerp);
            if self.returning && !suspend_return {
                self.return_rotation(body, dt, config);
            }

            self.release_timer -= dt;
            if self.release_timer <= 0.0 {
                self.release_timer = 0.0;
                self.restore_damping(body);
                body.linvel = Vec3::ZERO;
                body.angvel = Vec3::ZERO;
            }
            return;
        }

        if self.returning && !suspend_return {
            self.return_rotation(body, dt, config);
        }
    }

    fn orbit(&mut self, body: &mut BodyState, origin: Vec3, dt: f32, config: &KiteConfig) {
        let altitude = body.position.y;
        self.orbit_angle += self.orbit_sign * config.orbit_angular_speed * dt;

        let target = orbit_point(origin, altitude, self.orbit_angle, config);
        body.position = body.position.lerp(target, config.orbit_smoothness);

        let spin = self.spin_sign * config.spin_speed_deg.to_radians() * dt;
        body.rotation = (body.rotation * Quat::from_rotation_x(spin)).normalize();

        // The pose is set directly; leftover velocity would only fight it.
        body.linvel = Vec3::ZERO;
        body.angvel = Vec3::ZERO;
    }

    fn return_rotation(&mut self, body: &mut BodyState, dt: f32, config: &KiteConfig) {
        let max_step = config.rotation_return_speed_deg.to_radians() * dt;
        let next = rotate_towards(body.rotation, self.rest_rotation, max_step);
        if next.angle_between(self.rest_rotation) <= config.return_threshold_deg.to_radians() {
            body.rotation = self.rest_rotation;
            self.returning = false;
        } else {
            body.rotation = next;
        }
    }

    fn restore_damping(&mut self, body: &mut BodyState) {
        if let Some((linear, angular)) = self.saved_damping.take() {
            body.linear_damping = linear;
            body.angular_damping = angular;
        }
    }
}

/// Orbit radius at `altitude`, never below `min_orbit_radius`.
pub fn orbit_radius(altitude: f32, config: &KiteConfig) -> f32 {
    (altitude * config.orbit_radius_multiplier + config.base_orbit_radius)
        .max(config.min_orbit_radius)
}

/// Point on the horizontal orbit circle around `origin`, at world height
/// `altitude`.
pub fn orbit_point(origin: Vec3, altitude: f32, angle: f32, config: &KiteConfig) -> Vec3 {
    let radius = orbit_radius(altitude, config);
    Vec3::new(
        origin.x + angle.cos() * radius,
        altitude,
        origin.z + angle.sin() * radius,
    )
}

/// Step every kite's state machine.
///
/// Skipped for a kite whose pose control has been handed to thrust by the
/// `thrust_wins` policy; the orbit resumes where it left off.
pub fn kite_motion_system(
    mut kites: Query<
        (
            &mut KiteMotion,
            &Tether,
            &PayloadMode,
            &mut Transform,
            &mut Velocity,
            &mut Damping,
            Has<PlayerKite>,
        ),
        With<Kite>,
    >,
    anchors: Query<&Transform, Without<Kite>>,
    intent: Res<KiteIntent>,
    time: Res<Time>,
    config: Res<KiteConfig>,
) {
    let dt = time.delta_secs();
    for (mut motion, tether, mode, mut transform, mut velocity, mut damping, is_player) in
        kites.iter_mut()
    {
        if *mode == PayloadMode::ThrustControlled && motion.is_pose_controlled() {
            continue;
        }
        if motion.state() == MotionState::Free {
            continue;
        }

        let origin = anchors
            .get(tether.anchor)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO);
        let suspend_return = config.pause_return_while_descending && is_player && intent.thrust;

        let mut body = BodyState::read(&transform, &velocity, &damping);
        motion.tick(&mut body, origin, dt, &config, suspend_return);
        body.apply_pose(&mut transform);
        body.apply_velocity(&mut velocity);
        body.apply_damping(&mut damping);
    }
}
