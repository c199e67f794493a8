//! Centralised tether, flight and control constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::KiteConfig::default`] is built from these values; a
//! `assets/kite.toml` file can override any subset at startup.
//!
//! ## Units
//!
//! Lengths are metres, masses kilograms, angles degrees (converted to radians
//! at the point of use), forces newtons and durations seconds.

// ── Rope: Segments ────────────────────────────────────────────────────────────

/// Spacing between consecutive segment centres, and the length of each segment.
pub const SEGMENT_LENGTH: f32 = 0.3;

/// Mass of a single rope segment.
///
/// Kept far below `KITE_MASS` so the chain drapes under the kite instead of
/// dragging it down.
pub const SEGMENT_MASS: f32 = 0.05;

/// Capsule radius of a segment collider.
pub const SEGMENT_RADIUS: f32 = 0.03;

/// Number of segments created when a rope is first built.
pub const INITIAL_SEGMENT_COUNT: usize = 3;

// ── Rope: Joints ──────────────────────────────────────────────────────────────

/// Translation slack allowed on each axis of a segment joint.
pub const JOINT_LINEAR_LIMIT: f32 = 0.05;

/// Spring stiffness pulling a segment joint back to zero offset.
pub const JOINT_SPRING: f32 = 50.0;

/// Damping applied by the same spring.
pub const JOINT_DAMPER: f32 = 5.0;

/// Swing limit about the segment's local X axis.  Rotation about the chain
/// axis (local Y) is free.
pub const JOINT_SWING_X_DEG: f32 = 45.0;

/// Swing limit about the segment's local Z axis.
pub const JOINT_SWING_Z_DEG: f32 = 45.0;

/// Payload joint translation slack, as a multiple of `SEGMENT_LENGTH`.
pub const PAYLOAD_LINEAR_LIMIT_FACTOR: f32 = 1.5;

/// Swing limit (both axes) of the joint tying the kite to the rope.
pub const PAYLOAD_SWING_LIMIT_DEG: f32 = 60.0;

/// Height of the freshly spawned kite above the tail, as a multiple of
/// `SEGMENT_LENGTH`.
pub const PAYLOAD_SPAWN_FACTOR: f32 = 0.8;

// ── Kite Body ─────────────────────────────────────────────────────────────────

pub const KITE_MASS: f32 = 1.0;

/// Half extents of the kite's flat cuboid collider.
pub const KITE_HALF_EXTENTS: [f32; 3] = [0.5, 0.5, 0.02];

/// Point on the kite (local space) where the rope attaches.
pub const KITE_ATTACH_OFFSET: [f32; 3] = [0.5, 0.0, 0.0];

/// Rest orientation as `[pitch, yaw, roll]` degrees.
///
/// The kite spawns in this orientation and returns to it after a release.
pub const KITE_REST_EULER_DEG: [f32; 3] = [-45.0, 90.0, 0.0];

pub const KITE_LINEAR_DAMPING: f32 = 0.0;
pub const KITE_ANGULAR_DAMPING: f32 = 0.05;

// ── Segment Count Controller ──────────────────────────────────────────────────

/// Altitude gain (above the reference) that earns one extra segment.
///
/// Lower values grow the rope faster; values below `SEGMENT_LENGTH` make the
/// rope outgrow the kite and drape.
pub const HEIGHT_STEP: f32 = 10.0;

/// Upper bound on segments appended (or removed) in a single tick.
pub const MAX_SEGMENTS_PER_TICK: usize = 3;

/// Lower bound used by the shrink-on-descent policy.
pub const MIN_SEGMENTS: usize = 3;

/// Hard upper bound on chain length regardless of lift.
pub const MAX_SEGMENTS: usize = 100;

/// Lift per unit of capacity: `capacity = floor(lift / LIFT_PER_SEGMENT)`.
pub const LIFT_PER_SEGMENT: f32 = 10.0;

// ── Lift / Wind ───────────────────────────────────────────────────────────────

pub const INITIAL_LIFT: f32 = 0.0;
pub const INITIAL_WIND: f32 = 0.0;

/// Rate (per second) at which lift and wind ramp while the kite flies free.
///
/// At 2.0 a 1 kg kite overcomes gravity after roughly five seconds.
pub const LIFT_CHANGE_RATE: f32 = 2.0;

/// Altitude above which lift and wind stop ramping.
pub const HEIGHT_LIMIT: f32 = 40.0;

/// Direction the wind blows; normalised at the point of use.
pub const WIND_DIRECTION: [f32; 3] = [0.0, 0.0, 1.0];

// ── Orbit (held) ──────────────────────────────────────────────────────────────

/// `radius = altitude * ORBIT_RADIUS_MULTIPLIER + BASE_ORBIT_RADIUS`.
pub const ORBIT_RADIUS_MULTIPLIER: f32 = 0.25;
pub const BASE_ORBIT_RADIUS: f32 = 2.0;

/// Floor applied to the computed radius.
pub const MIN_ORBIT_RADIUS: f32 = 0.01;

/// Orbit angular speed (radians per second).
pub const ORBIT_ANGULAR_SPEED: f32 = 1.5;

/// Fraction of the remaining distance to the orbit target covered per tick.
///
/// This is per-tick smoothing, so responsiveness scales with the physics rate.
pub const ORBIT_SMOOTHNESS: f32 = 0.15;

/// Spin about the kite's local X axis while held (degrees per second).
pub const SPIN_SPEED_DEG: f32 = 60.0;

// ── Release ───────────────────────────────────────────────────────────────────

/// Rate at which the kite turns back to its rest orientation (degrees per second).
pub const ROTATION_RETURN_SPEED_DEG: f32 = 180.0;

/// Remaining angle below which the orientation snaps exactly to rest.
pub const RETURN_THRESHOLD_DEG: f32 = 1.0;

/// Length of the post-release damping and anchoring window.
pub const RELEASE_DAMPING_DURATION: f32 = 0.35;

pub const RELEASE_LINEAR_DAMPING: f32 = 8.0;
pub const RELEASE_ANGULAR_DAMPING: f32 = 8.0;

/// Fraction of the distance back to the release anchor covered per tick.
pub const RELEASE_POSITION_LERP: f32 = 0.6;

// ── Thrust / Pull ─────────────────────────────────────────────────────────────

/// Offset applied to the kite's rotation before taking its forward axis,
/// as `[pitch, yaw, roll]` degrees.
pub const FACE_OFFSET_DEG: [f32; 3] = [-45.0, 0.0, 0.0];

/// Target speed along the face direction while thrusting.
pub const THRUST_SPEED: f32 = 25.0;

/// Maximum velocity change per second while thrusting.
pub const THRUST_ACCEL: f32 = 80.0;

/// Window after release over which angular and vertical velocity fade out.
pub const THRUST_RELEASE_FADE: f32 = 0.25;

/// Extra linear damping added on release.
pub const THRUST_RELEASE_EXTRA_DAMPING: f32 = 4.0;

/// How long the extra damping stays active after release.
pub const THRUST_RELEASE_DAMPING_DURATION: f32 = 0.3;

/// Fraction of the backward (against-face) velocity removed on release.
pub const BACKWARD_STRIP_STRENGTH: f32 = 0.9;

/// Scale on the fade fraction used when blending vertical velocity to zero.
pub const VERTICAL_FADE_FACTOR: f32 = 0.2;

// ── Simulation ────────────────────────────────────────────────────────────────

/// Fixed physics rate (Hz).
pub const PHYSICS_HZ: f64 = 50.0;
