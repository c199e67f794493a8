//! Kite components and resources.
//!
//! Systems that mutate this state live in the sibling modules:
//! - [`super::lift`]: lift/wind ramp and force
//! - [`super::motion`]: hold/orbit/release
//! - [`super::thrust`]: pull-to-dive thrust
//! - [`super::control`]: input and the payload-mode arbiter

use crate::config::HoldConflictPolicy;
use bevy::prelude::*;

// ── Components ─────────────────────────────────────────────────────────────────

/// Marker for every kite body.
#[derive(Component, Debug, Clone, Copy)]
pub struct Kite;

/// Marker for the kite that answers to the keyboard.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerKite;

/// Which rope a kite flies on, and the fixed body that rope hangs from.
///
/// The anchor doubles as the centre of the orbit while the line is held.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tether {
    pub rope: Entity,
    pub anchor: Entity,
}

/// The one controller allowed to write to the kite body this tick.
///
/// | Mode | Writer |
/// |------|--------|
/// | `Ballistic` | lift/wind force; physics integrates freely |
/// | `Orbiting` | hold/release pose override; lift force and gravity off |
/// | `ThrustControlled` | thrust velocity steering; lift force off |
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadMode {
    #[default]
    Ballistic,
    Orbiting,
    ThrustControlled,
}

/// Pick the writer for one tick.
///
/// `pose_controlled` is true while the kite is held or still inside its
/// release window.  Only when both it and `thrusting` are set does the policy
/// matter.
pub fn resolve_mode(
    pose_controlled: bool,
    thrusting: bool,
    policy: HoldConflictPolicy,
) -> PayloadMode {
    match (pose_controlled, thrusting) {
        (true, true) => match policy {
            HoldConflictPolicy::HoldWins => PayloadMode::Orbiting,
            HoldConflictPolicy::ThrustWins => PayloadMode::ThrustControlled,
        },
        (true, false) => PayloadMode::Orbiting,
        (false, true) => PayloadMode::ThrustControlled,
        (false, false) => PayloadMode::Ballistic,
    }
}

// ── Resources ──────────────────────────────────────────────────────────────────

/// Keyboard state for the player kite, sampled once per rendered frame.
///
/// Edges (`hold_begin`, `hold_end`) are valid for the frame they were seen in
/// only; levels (`hold`, `thrust`) persist until the next sample.  Tests write
/// this resource directly instead of faking key presses.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KiteIntent {
    pub hold_begin: bool,
    pub hold_end: bool,
    pub hold: bool,
    /// Thrust key down.  Also the descent key for lift decay and the
    /// return-rotation pause.
    pub thrust: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_writer_without_conflict() {
        for policy in [HoldConflictPolicy::HoldWins, HoldConflictPolicy::ThrustWins] {
            assert_eq!(resolve_mode(false, false, policy), PayloadMode::Ballistic);
            assert_eq!(resolve_mode(true, false, policy), PayloadMode::Orbiting);
            assert_eq!(resolve_mode(false, true, policy), PayloadMode::ThrustControlled);
        }
    }

    #[test]
    fn policy_breaks_hold_thrust_conflict() {
        assert_eq!(
            resolve_mode(true, true, HoldConflictPolicy::HoldWins),
            PayloadMode::Orbiting
        );
        assert_eq!(
            resolve_mode(true, true, HoldConflictPolicy::ThrustWins),
            PayloadMode::ThrustControlled
        );
    }
}
