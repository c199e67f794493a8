//! Lift/wind driver.
//!
//! While the kite is free, lift and wind ramp up together at
//! `lift_change_rate` per second until the kite reaches `height_limit`.
//! Holding the line freezes both.  The resulting force is written into the
//! kite's `ExternalForce` every fixed tick in which the kite is ballistic.
//!
//! After each physics step [`lift_report_system`] publishes a [`LiftReport`]
//! per kite (altitude, lift and the segment capacity that lift buys), which
//! the segment-count controller consumes.

use super::body::BodyState;
use super::state::{Kite, KiteIntent, PayloadMode, PlayerKite, Tether};
use crate::config::KiteConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Lift and wind magnitudes of one kite.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct LiftWind {
    lift: f32,
    wind: f32,
    held: bool,
}

impl LiftWind {
    pub fn new(lift: f32, wind: f32) -> Self {
        Self {
            lift: lift.max(0.0),
            wind: wind.max(0.0),
            held: false,
        }
    }

    pub fn lift(&self) -> f32 {
        self.lift
    }

    pub fn wind(&self) -> f32 {
        self.wind
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Freeze or unfreeze the ramp.  Entering the held state kills the body's
    /// vertical velocity.  Returns `false` if nothing changed.
    pub fn set_held(&mut self, held: bool, body: &mut BodyState) -> bool {
        if self.held == held {
            return false;
        }
        self.held = held;
        if held {
            body.linvel.y = 0.0;
        }
        true
    }

    /// Advance the ramp by `dt` seconds.
    ///
    /// `descending` is the descent key: it blocks the climb, and with
    /// `enable_lift_decay` it bleeds lift and wind down toward zero.
    pub fn ramp(&mut self, dt: f32, altitude: f32, descending: bool, config: &KiteConfig) {
        if self.held {
            return;
        }
        let change = config.lift_change_rate * dt;
        if descending {
            if config.enable_lift_decay {
                self.lift = (self.lift - change).max(0.0);
                self.wind = (self.wind - change).max(0.0);
            }
        } else if altitude < config.height_limit {
            self.lift += change;
            self.wind += change;
        }
    }

    /// Force to apply this tick: straight up by lift, along the wind
    /// direction by wind.
    pub fn force(&self, config: &KiteConfig) -> Vec3 {
        let wind_dir = Vec3::from_array(config.wind_direction).normalize_or_zero();
        Vec3::Y * self.lift + wind_dir * self.wind
    }
}

/// How many segments `lift` can carry, bounded by `max_segments`.
pub fn segment_capacity(lift: f32, config: &KiteConfig) -> usize {
    let raw = (lift / config.lift_per_segment).floor().max(0.0) as usize;
    raw.min(config.max_segments)
}

/// Published once per kite per physics step.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct LiftReport {
    pub rope: Entity,
    pub kite: Entity,
    pub altitude: f32,
    pub lift: f32,
    pub capacity: usize,
}

/// Ramp lift/wind and write the lift force for ballistic kites.
///
/// Kites in any other mode get a zero force, so the pose override or thrust
/// steering is the only thing acting on them.
pub fn lift_wind_system(
    mut q: Query<
        (
            &mut LiftWind,
            &Transform,
            &mut ExternalForce,
            &PayloadMode,
            Has<PlayerKite>,
        ),
        With<Kite>,
    >,
    intent: Res<KiteIntent>,
    time: Res<Time>,
    config: Res<KiteConfig>,
) {
    let dt = time.delta_secs();
    for (mut lift, transform, mut force, mode, is_player) in q.iter_mut() {
        let descending = is_player && intent.thrust;
        lift.ramp(dt, transform.translation.y, descending, &config);

        let wanted = if *mode == PayloadMode::Ballistic {
            lift.force(&config)
        } else {
            Vec3::ZERO
        };
        if force.force != wanted {
            force.force = wanted;
        }
        if force.torque != Vec3::ZERO {
            force.torque = Vec3::ZERO;
        }
    }
}

/// Publish altitude, lift and capacity for every tethered kite.
pub fn lift_report_system(
    q: Query<(Entity, &Tether, &LiftWind, &Transform), With<Kite>>,
    config: Res<KiteConfig>,
    mut reports: MessageWriter<LiftReport>,
) {
    for (kite, tether, lift, transform) in q.iter() {
        reports.write(LiftReport {
            rope: tether.rope,
            kite,
            altitude: transform.translation.y,
            lift: lift.lift(),
            capacity: segment_capacity(lift.lift(), &config),
        });
    }
}
