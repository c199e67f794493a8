//! Runtime kite configuration loaded from `assets/kite.toml`.
//!
//! [`KiteConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_kite_config`] reads
//! `assets/kite.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<KiteConfig>` to any system parameter list and read values
//! with `config.height_step`, `config.thrust_speed`, etc.
//!
//! ## Policy flags
//!
//! Behaviours that are off in normal play are explicit switches rather than
//! dead code:
//!
//! | Flag | Default | Effect |
//! |------|---------|--------|
//! | `enable_shrink_on_descent` | off | remove segments when the kite drops a full `height_step` |
//! | `enable_lift_decay` | off | holding the descent key bleeds lift and wind |
//! | `pause_return_while_descending` | off | descent key pauses the return-to-rest rotation |
//! | `hold_conflict_policy` | `hold_wins` | which controller steers when hold and thrust are both active |

use crate::constants::*;
use crate::error::{validate_non_negative, validate_positive, validate_unit_interval, KiteError};
use crate::rope::RopeOwner;
use bevy::prelude::*;
use serde::Deserialize;

/// Which payload controller wins when the hold key and the thrust key are
/// both active on the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldConflictPolicy {
    /// Orbit keeps control; thrust input is ignored while held.
    #[default]
    HoldWins,
    /// Thrust takes over; the orbit state machine pauses until thrust ends.
    ThrustWins,
}

/// One rope to spawn at startup.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpawnPoint {
    /// World position of the rope's fixed anchor.
    pub position: [f32; 3],
    #[serde(default)]
    pub owner: RopeOwner,
}

/// Runtime-tunable tether, flight and control configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/kite.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KiteConfig {
    // ── Rope: Segments ────────────────────────────────────────────────────────
    pub segment_length: f32,
    pub segment_mass: f32,
    pub segment_radius: f32,
    pub initial_segment_count: usize,

    // ── Rope: Joints ──────────────────────────────────────────────────────────
    pub joint_linear_limit: f32,
    pub joint_spring: f32,
    pub joint_damper: f32,
    pub joint_swing_x_deg: f32,
    pub joint_swing_z_deg: f32,
    pub payload_linear_limit_factor: f32,
    pub payload_swing_limit_deg: f32,
    pub payload_spawn_factor: f32,

    // ── Kite Body ─────────────────────────────────────────────────────────────
    pub kite_mass: f32,
    pub kite_half_extents: [f32; 3],
    pub kite_attach_offset: [f32; 3],
    pub kite_rest_euler_deg: [f32; 3],
    pub kite_linear_damping: f32,
    pub kite_angular_damping: f32,

    // ── Segment Count Controller ──────────────────────────────────────────────
    pub height_step: f32,
    pub max_segments_per_tick: usize,
    pub min_segments: usize,
    pub max_segments: usize,
    pub lift_per_segment: f32,
    pub enable_shrink_on_descent: bool,

    // ── Lift / Wind ───────────────────────────────────────────────────────────
    pub initial_lift: f32,
    pub initial_wind: f32,
    pub lift_change_rate: f32,
    pub height_limit: f32,
    pub wind_direction: [f32; 3],
    pub enable_lift_decay: bool,

    // ── Orbit ─────────────────────────────────────────────────────────────────
    pub orbit_radius_multiplier: f32,
    pub base_orbit_radius: f32,
    pub min_orbit_radius: f32,
    pub orbit_angular_speed: f32,
    pub orbit_smoothness: f32,
    pub spin_speed_deg: f32,

    // ── Release ───────────────────────────────────────────────────────────────
    pub rotation_return_speed_deg: f32,
    pub return_threshold_deg: f32,
    pub release_damping_duration: f32,
    pub release_linear_damping: f32,
    pub release_angular_damping: f32,
    pub release_position_lerp: f32,
    pub pause_return_while_descending: bool,

    // ── Thrust / Pull ─────────────────────────────────────────────────────────
    pub face_offset_deg: [f32; 3],
    pub thrust_speed: f32,
    pub thrust_accel: f32,
    pub thrust_release_fade: f32,
    pub thrust_release_extra_damping: f32,
    pub thrust_release_damping_duration: f32,
    pub strip_backward_on_release: bool,
    pub backward_strip_strength: f32,
    pub vertical_fade_factor: f32,

    // ── Arbitration ───────────────────────────────────────────────────────────
    pub hold_conflict_policy: HoldConflictPolicy,

    // ── Simulation ────────────────────────────────────────────────────────────
    pub physics_hz: f64,
    pub spawn_points: Vec<SpawnPoint>,
}

impl Default for KiteConfig {
    fn default() -> Self {
        Self {
            // Rope: Segments
            segment_length: SEGMENT_LENGTH,
            segment_mass: SEGMENT_MASS,
            segment_radius: SEGMENT_RADIUS,
            initial_segment_count: INITIAL_SEGMENT_COUNT,
            // Rope: Joints
            joint_linear_limit: JOINT_LINEAR_LIMIT,
            joint_spring: JOINT_SPRING,
            joint_damper: JOINT_DAMPER,
            joint_swing_x_deg: JOINT_SWING_X_DEG,
            joint_swing_z_deg: JOINT_SWING_Z_DEG,
            payload_linear_limit_factor: PAYLOAD_LINEAR_LIMIT_FACTOR,
            payload_swing_limit_deg: PAYLOAD_SWING_LIMIT_DEG,
            payload_spawn_factor: PAYLOAD_SPAWN_FACTOR,
            // Kite Body
            kite_mass: KITE_MASS,
            kite_half_extents: KITE_HALF_EXTENTS,
            kite_attach_offset: KITE_ATTACH_OFFSET,
            kite_rest_euler_deg: KITE_REST_EULER_DEG,
            kite_linear_damping: KITE_LINEAR_DAMPING,
            kite_angular_damping: KITE_ANGULAR_DAMPING,
            // Segment Count Controller
            height_step: HEIGHT_STEP,
            max_segments_per_tick: MAX_SEGMENTS_PER_TICK,
            min_segments: MIN_SEGMENTS,
            max_segments: MAX_SEGMENTS,
            lift_per_segment: LIFT_PER_SEGMENT,
            enable_shrink_on_descent: false,
            // Lift / Wind
            initial_lift: INITIAL_LIFT,
            initial_wind: INITIAL_WIND,
            lift_change_rate: LIFT_CHANGE_RATE,
            height_limit: HEIGHT_LIMIT,
            wind_direction: WIND_DIRECTION,
            enable_lift_decay: false,
            // Orbit
            orbit_radius_multiplier: ORBIT_RADIUS_MULTIPLIER,
            base_orbit_radius: BASE_ORBIT_RADIUS,
            min_orbit_radius: MIN_ORBIT_RADIUS,
            orbit_angular_speed: ORBIT_ANGULAR_SPEED,
            orbit_smoothness: ORBIT_SMOOTHNESS,
            spin_speed_deg: SPIN_SPEED_DEG,
            // Release
            rotation_return_speed_deg: ROTATION_RETURN_SPEED_DEG,
            return_threshold_deg: RETURN_THRESHOLD_DEG,
            release_damping_duration: RELEASE_DAMPING_DURATION,
            release_linear_damping: RELEASE_LINEAR_DAMPING,
            release_angular_damping: RELEASE_ANGULAR_DAMPING,
            release_position_lerp: RELEASE_POSITION_LERP,
            pause_return_while_descending: false,
            // Thrust / Pull
            face_offset_deg: FACE_OFFSET_DEG,
            thrust_speed: THRUST_SPEED,
            thrust_accel: THRUST_ACCEL,
            thrust_release_fade: THRUST_RELEASE_FADE,
            thrust_release_extra_damping: THRUST_RELEASE_EXTRA_DAMPING,
            thrust_release_damping_duration: THRUST_RELEASE_DAMPING_DURATION,
            strip_backward_on_release: true,
            backward_strip_strength: BACKWARD_STRIP_STRENGTH,
            vertical_fade_factor: VERTICAL_FADE_FACTOR,
            // Arbitration
            hold_conflict_policy: HoldConflictPolicy::default(),
            // Simulation
            physics_hz: PHYSICS_HZ,
            spawn_points: vec![SpawnPoint {
                position: [0.0, 0.0, 0.0],
                owner: RopeOwner::Player,
            }],
        }
    }
}

impl KiteConfig {
    /// Check every range-constrained field and reset offenders to their
    /// compiled default.  Returns one error per field that was reset.
    pub fn sanitize(&mut self) -> Vec<KiteError> {
        let defaults = KiteConfig::default();
        let mut problems = Vec::new();

        macro_rules! check {
            ($validator:ident, $field:ident) => {
                if let Err(e) = $validator(stringify!($field), self.$field) {
                    problems.push(e);
                    self.$field = defaults.$field;
                }
            };
        }

        check!(validate_positive, segment_length);
        check!(validate_positive, segment_mass);
        check!(validate_positive, segment_radius);
        check!(validate_non_negative, joint_linear_limit);
        check!(validate_non_negative, joint_spring);
        check!(validate_non_negative, joint_damper);
        check!(validate_positive, kite_mass);
        check!(validate_positive, height_step);
        check!(validate_positive, lift_per_segment);
        check!(validate_non_negative, lift_change_rate);
        check!(validate_positive, min_orbit_radius);
        check!(validate_unit_interval, orbit_smoothness);
        check!(validate_non_negative, rotation_return_speed_deg);
        check!(validate_non_negative, return_threshold_deg);
        check!(validate_non_negative, release_damping_duration);
        check!(validate_unit_interval, release_position_lerp);
        check!(validate_non_negative, thrust_accel);
        check!(validate_non_negative, thrust_release_fade);
        check!(validate_non_negative, thrust_release_damping_duration);
        check!(validate_unit_interval, backward_strip_strength);

        if self.max_segments_per_tick == 0 {
            problems.push(KiteError::InvalidConfig {
                name: "max_segments_per_tick",
                value: 0.0,
                expected: "[1, ∞)",
            });
            self.max_segments_per_tick = defaults.max_segments_per_tick;
        }
        if self.min_segments > self.max_segments {
            problems.push(KiteError::InvalidConfig {
                name: "min_segments",
                value: self.min_segments as f32,
                expected: "[0, max_segments]",
            });
            self.min_segments = self.min_segments.min(self.max_segments);
        }
        if !(self.physics_hz > 0.0) {
            problems.push(KiteError::InvalidConfig {
                name: "physics_hz",
                value: self.physics_hz as f32,
                expected: "(0.0, ∞)",
            });
            self.physics_hz = defaults.physics_hz;
        }

        problems
    }
}

/// Startup system: attempt to load `assets/kite.toml` and overwrite the
/// `KiteConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the simulation.  A missing file is not an error.  Also
/// applies `physics_hz` to the fixed timestep.
pub fn load_kite_config(mut config: ResMut<KiteConfig>, mut fixed: ResMut<Time<Fixed>>) {
    let path = "assets/kite.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<KiteConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded kite config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {path} found; using compiled defaults");
        }
    }

    for problem in config.sanitize() {
        warn!("{problem}; falling back to default");
    }

    fixed.set_timestep_hz(config.physics_hz);
}
