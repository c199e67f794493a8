//! [`RopeBackend`] over Bevy `Commands` and Rapier components.
//!
//! Every mutation is a deferred command, so a rope edited from a system only
//! changes the world at the next sync point.  Bodies spawned during the same
//! pass are not queryable yet; their positions are remembered locally so a
//! multi-segment append can stack on top of segments that do not exist yet.

use super::chain::{JointParams, PayloadTemplate, RopeBackend, SegmentTemplate};
use crate::config::KiteConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::HashMap;

/// Marker + back-reference carried by every segment body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RopeSegment {
    /// Entity holding the owning [`super::Rope`].
    pub rope: Entity,
    /// Position in the chain at creation time, anchor end first.
    pub index: usize,
}

/// Marker for the fixed body a rope hangs from.
#[derive(Component, Debug, Clone, Copy)]
pub struct RopeAnchor;

/// Build the Rapier joint described by `params`.
pub fn generic_joint(params: &JointParams) -> GenericJoint {
    let mut builder = GenericJointBuilder::new(JointAxesMask::empty())
        .local_anchor1(params.parent_anchor)
        .local_anchor2(params.child_anchor);

    for axis in [JointAxis::LinX, JointAxis::LinY, JointAxis::LinZ] {
        builder = builder.limits(axis, [-params.linear_limit, params.linear_limit]);
        if params.spring > 0.0 {
            builder = builder.motor_position(axis, 0.0, params.spring, params.damper);
        }
    }

    let mut joint = builder
        .limits(
            JointAxis::AngX,
            [-params.swing_limit.x, params.swing_limit.x],
        )
        .limits(
            JointAxis::AngZ,
            [-params.swing_limit.y, params.swing_limit.y],
        )
        .build();
    joint.set_contacts_enabled(false);
    joint
}

fn impulse_joint(parent: Entity, params: &JointParams) -> ImpulseJoint {
    ImpulseJoint::new(parent, TypedJoint::GenericJoint(generic_joint(params)))
}

/// Rope backend that issues `Commands` for one rope.
pub struct CommandsBackend<'a, 'w, 's, F>
where
    F: Fn(Entity) -> Option<Vec3>,
{
    commands: &'a mut Commands<'w, 's>,
    rope: Entity,
    config: &'a KiteConfig,
    locate: F,
    pending: HashMap<Entity, Vec3>,
}

impl<'a, 'w, 's, F> CommandsBackend<'a, 'w, 's, F>
where
    F: Fn(Entity) -> Option<Vec3>,
{
    /// `locate` resolves positions of bodies that already exist in the world.
    pub fn new(commands: &'a mut Commands<'w, 's>, rope: Entity, config: &'a KiteConfig, locate: F) -> Self {
        Self {
            commands,
            rope,
            config,
            locate,
            pending: HashMap::new(),
        }
    }

    /// Register the position of a body spawned earlier in the same pass.
    pub fn with_known_position(mut self, body: Entity, position: Vec3) -> Self {
        self.pending.insert(body, position);
        self
    }
}

impl<F> RopeBackend for CommandsBackend<'_, '_, '_, F>
where
    F: Fn(Entity) -> Option<Vec3>,
{
    fn spawn_segment(&mut self, index: usize, template: &SegmentTemplate, position: Vec3) -> Entity {
        let half_height = (template.length * 0.5 - template.radius).max(0.0);
        let id = self
            .commands
            .spawn((
                RopeSegment {
                    rope: self.rope,
                    index,
                },
                Name::new(format!("Segment {index}")),
                RigidBody::Dynamic,
                Collider::capsule_y(half_height, template.radius),
                ColliderMassProperties::Mass(template.mass),
                Velocity::zero(),
                Ccd::enabled(),
                ActiveEvents::COLLISION_EVENTS,
                Transform::from_translation(position),
            ))
            .id();
        self.pending.insert(id, position);
        id
    }

    fn spawn_payload(&mut self, template: &PayloadTemplate, position: Vec3, anchor: Entity) -> Entity {
        let id = crate::kite::spawn_kite(
            self.commands,
            self.rope,
            anchor,
            template,
            position,
            self.config,
        );
        self.pending.insert(id, position);
        id
    }

    fn link(&mut self, child: Entity, parent: Entity, params: &JointParams) {
        self.commands
            .entity(child)
            .insert(impulse_joint(parent, params));
    }

    fn retarget(&mut self, child: Entity, parent: Entity, params: &JointParams) {
        // Rapier only copies joint data on change and keeps the old bodies.
        // Dropping the handle makes the next sync remove the old joint and
        // build a fresh one against `parent`.
        self.commands
            .entity(child)
            .remove::<RapierImpulseJointHandle>()
            .insert(impulse_joint(parent, params));
    }

    fn destroy(&mut self, body: Entity) {
        self.pending.remove(&body);
        self.commands.entity(body).despawn();
    }

    fn position(&self, body: Entity) -> Option<Vec3> {
        self.pending
            .get(&body)
            .copied()
            .or_else(|| (self.locate)(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rope::Rope;

    #[test]
    fn joint_anchors_follow_params() {
        let params = JointParams {
            parent_anchor: Vec3::Y * 0.15,
            child_anchor: Vec3::NEG_Y * 0.15,
            linear_limit: 0.05,
            spring: 50.0,
            damper: 5.0,
            swing_limit: Vec2::splat(0.5),
        };
        let joint = generic_joint(&params);
        assert_eq!(joint.local_anchor1(), params.parent_anchor);
        assert_eq!(joint.local_anchor2(), params.child_anchor);
    }

    #[test]
    fn build_through_commands_tags_segments() {
        let mut world = World::new();
        let config = KiteConfig::default();
        let rope_entity = world.spawn_empty().id();
        let anchor = world.spawn(Transform::default()).id();

        let mut queue = bevy::ecs::world::CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            let mut backend = CommandsBackend::new(&mut commands, rope_entity, &config, |_| None)
                .with_known_position(anchor, Vec3::ZERO);
            let mut rope = Rope::from_config(Some(anchor), &config);
            rope.build(&mut backend, 2).expect("build succeeds");
        }
        queue.apply(&mut world);

        let mut segments = world.query::<(&RopeSegment, &Transform, &ImpulseJoint)>();
        let mut found: Vec<(usize, f32)> = segments
            .iter(&world)
            .map(|(seg, t, _)| {
                assert_eq!(seg.rope, rope_entity);
                (seg.index, t.translation.y)
            })
            .collect();
        found.sort_by_key(|(i, _)| *i);
        assert_eq!(found.len(), 2);
        assert!((found[0].1 - 0.3).abs() < 1e-5);
        assert!((found[1].1 - 0.6).abs() < 1e-5);
    }

    #[test]
    fn retarget_drops_the_physics_handle_so_the_joint_is_rebuilt() {
        use bevy_rapier3d::rapier::dynamics::ImpulseJointHandle;

        let mut world = World::new();
        let config = KiteConfig::default();
        let rope_entity = world.spawn_empty().id();
        let old_tail = world.spawn_empty().id();
        let new_tail = world.spawn_empty().id();
        let params = JointParams {
            parent_anchor: Vec3::Y * 0.15,
            child_anchor: Vec3::ZERO,
            linear_limit: 0.05,
            spring: 0.0,
            damper: 0.0,
            swing_limit: Vec2::splat(0.5),
        };
        let kite = world
            .spawn((
                ImpulseJoint::new(old_tail, TypedJoint::GenericJoint(generic_joint(&params))),
                RapierImpulseJointHandle(ImpulseJointHandle::from_raw_parts(0, 0)),
            ))
            .id();

        let mut queue = bevy::ecs::world::CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            let mut backend = CommandsBackend::new(&mut commands, rope_entity, &config, |_| None);
            backend.retarget(kite, new_tail, &params);
        }
        queue.apply(&mut world);

        assert!(world.get::<RapierImpulseJointHandle>(kite).is_none());
        let joint = world.get::<ImpulseJoint>(kite).unwrap();
        assert_eq!(joint.parent, new_tail);
        let TypedJoint::GenericJoint(data) = joint.data else {
            panic!("expected a generic joint");
        };
        assert!(!data.contacts_enabled());
    }
}
