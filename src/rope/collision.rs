//! Rope-on-rope contact reporting.
//!
//! When segments of two different ropes start touching, the contact is logged
//! with both kites' names and published as a [`RopeCrossing`] message for any
//! gameplay system that wants to react (kite fights, line cutting).

use super::backend::RopeSegment;
use super::chain::{Rope, RopeOwner};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Two ropes with different kites started touching.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RopeCrossing {
    pub rope_a: Entity,
    pub rope_b: Entity,
    pub kite_a: Option<Entity>,
    pub kite_b: Option<Entity>,
}

/// Turn segment/segment `CollisionEvent::Started` events between different
/// ropes into log lines and [`RopeCrossing`] messages.
pub fn rope_collision_report_system(
    mut collision_events: MessageReader<CollisionEvent>,
    segments: Query<&RopeSegment>,
    ropes: Query<(&Rope, Option<&RopeOwner>)>,
    names: Query<&Name>,
    mut crossings: MessageWriter<RopeCrossing>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let (Ok(s1), Ok(s2)) = (segments.get(e1), segments.get(e2)) else {
            continue;
        };
        if s1.rope == s2.rope {
            continue;
        }

        let describe = |rope: Entity| -> (Option<Entity>, String) {
            let Ok((rope, owner)) = ropes.get(rope) else {
                return (None, "(unknown kite)".to_string());
            };
            let kite = rope.payload();
            let name = kite
                .and_then(|k| names.get(k).ok())
                .map(|n| n.as_str().to_string())
                .unwrap_or_else(|| "(unknown kite)".to_string());
            (kite, format!("{name} [{:?}]", owner.copied().unwrap_or_default()))
        };

        let (kite_a, label_a) = describe(s1.rope);
        let (kite_b, label_b) = describe(s2.rope);
        info!("Rope collision detected between {label_a} and {label_b}");

        crossings.write(RopeCrossing {
            rope_a: s1.rope,
            rope_b: s2.rope,
            kite_a,
            kite_b,
        });
    }
}
