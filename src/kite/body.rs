//! Plain-data view of the kite's rigid body.
//!
//! The flight controllers are written against [`BodyState`] rather than ECS
//! components, so they can be stepped in tests with no Bevy `App` and no
//! physics pipeline.  Systems copy the Rapier components in, run the logic,
//! and copy back only what changed; an unchanged `Transform` is never touched,
//! so Rapier does not see a spurious teleport.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Pose, velocities and damping of one rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }
}

impl BodyState {
    pub fn read(transform: &Transform, velocity: &Velocity, damping: &Damping) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
            linvel: velocity.linvel,
            angvel: velocity.angvel,
            linear_damping: damping.linear_damping,
            angular_damping: damping.angular_damping,
        }
    }

    /// Write position and rotation back if they changed.
    pub fn apply_pose(&self, transform: &mut Transform) {
        if transform.translation != self.position {
            transform.translation = self.position;
        }
        if transform.rotation != self.rotation {
            transform.rotation = self.rotation;
        }
    }

    pub fn apply_velocity(&self, velocity: &mut Velocity) {
        if velocity.linvel != self.linvel || velocity.angvel != self.angvel {
            velocity.linvel = self.linvel;
            velocity.angvel = self.angvel;
        }
    }

    pub fn apply_damping(&self, damping: &mut Damping) {
        if damping.linear_damping != self.linear_damping
            || damping.angular_damping != self.angular_damping
        {
            damping.linear_damping = self.linear_damping;
            damping.angular_damping = self.angular_damping;
        }
    }
}

/// Move `current` toward `target` by at most `max_delta`, without overshoot.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + to_target / distance * max_delta
    }
}

/// Rotate `from` toward `to` by at most `max_angle` radians, without overshoot.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        to
    } else {
        from.slerp(to, max_angle / angle)
    }
}

/// Orientation from `[pitch, yaw, roll]` degrees, applied yaw first, then
/// pitch, then roll.
///
/// Tuning angles are written for a left-handed, +Z-forward frame: positive
/// yaw turns the nose right (toward +X), negative pitch lifts it.  Mirroring
/// that frame into Bevy's right-handed, -Z-forward one negates yaw and pitch
/// and keeps roll.
pub fn euler_degrees(degrees: [f32; 3]) -> Quat {
    let [pitch, yaw, roll] = degrees;
    Quat::from_euler(
        EulerRot::YXZ,
        -yaw.to_radians(),
        -pitch.to_radians(),
        roll.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn move_towards_is_bounded_and_exact_at_arrival() {
        let start = Vec3::ZERO;
        let target = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(move_towards(start, target, 3.0), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(move_towards(Vec3::new(9.0, 0.0, 0.0), target, 3.0), target);
    }

    #[test]
    fn rotate_towards_steps_by_max_angle() {
        let to = Quat::from_rotation_y(FRAC_PI_2);
        let step = rotate_towards(Quat::IDENTITY, to, 0.25);
        assert!((step.angle_between(Quat::IDENTITY) - 0.25).abs() < 1e-4);
        assert_eq!(rotate_towards(Quat::IDENTITY, to, 2.0), to);
    }

    #[test]
    fn euler_degrees_yaw_turns_right_and_negative_pitch_lifts() {
        let forward = euler_degrees([0.0, 90.0, 0.0]) * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5, "got {forward:?}");

        let forward = euler_degrees([-45.0, 0.0, 0.0]) * Vec3::NEG_Z;
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!((forward - expected).length() < 1e-5, "got {forward:?}");
    }

    #[test]
    fn unchanged_pose_is_not_written() {
        let mut transform = Transform::from_xyz(1.0, 2.0, 3.0);
        let velocity = Velocity::zero();
        let damping = Damping::default();
        let body = BodyState::read(&transform, &velocity, &damping);
        body.apply_pose(&mut transform);
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
    }
}
