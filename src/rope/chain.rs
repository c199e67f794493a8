//! The rope itself: an ordered chain of jointed segments running from a fixed
//! anchor up to the kite.
//!
//! [`Rope`] is pure bookkeeping.  It decides *what* to spawn, link, re-point
//! and destroy, and hands every world mutation to a [`RopeBackend`].  The
//! production backend ([`super::CommandsBackend`]) turns those calls into
//! deferred `Commands`, which is what keeps topology edits out of the middle
//! of a physics step.
//!
//! ## Invariants
//!
//! - `segment_count()` equals the number of live segment bodies.
//! - Every segment is linked to its predecessor (the anchor for index 0), so
//!   the chain is a gap-free path from anchor to tail.
//! - The kite's joint always targets the current tail: the last segment, or
//!   the anchor once the chain is empty.  It is re-pointed, never duplicated.

use crate::config::KiteConfig;
use crate::error::{KiteError, KiteResult};
use crate::kite::euler_degrees;
use bevy::prelude::*;
use serde::Deserialize;

/// Who flies the kite at the end of a rope.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RopeOwner {
    #[default]
    Player,
    Rival,
}

/// Physical description of one rope segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTemplate {
    /// Segment length, which is also the spacing between segment centres.
    pub length: f32,
    pub mass: f32,
    pub radius: f32,
}

/// Physical description of the kite at the end of the rope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadTemplate {
    pub mass: f32,
    pub half_extents: Vec3,
    pub rest_rotation: Quat,
    /// Height above the tail at which the kite spawns.
    pub spawn_height: f32,
}

/// Parameters of the joint binding a body to its predecessor.
///
/// Translation is limited to `±linear_limit` on all three axes (and pulled
/// back by a spring when `spring > 0`).  Rotation about the chain axis
/// (local Y) is free; `swing_limit` bounds rotation about local X and Z, in
/// radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointParams {
    /// Attachment point on the predecessor, in its local space.
    pub parent_anchor: Vec3,
    /// Attachment point on the linked body, in its local space.
    pub child_anchor: Vec3,
    pub linear_limit: f32,
    pub spring: f32,
    pub damper: f32,
    pub swing_limit: Vec2,
}

impl JointParams {
    /// Same joint, attached at a different point on the predecessor.
    pub fn with_parent_anchor(self, parent_anchor: Vec3) -> Self {
        Self {
            parent_anchor,
            ..self
        }
    }
}

/// World services a [`Rope`] needs: spawn bodies, link them with joints,
/// re-point a joint, destroy bodies, and read positions.
pub trait RopeBackend {
    /// Spawn the `index`-th segment body at `position`.
    fn spawn_segment(&mut self, index: usize, template: &SegmentTemplate, position: Vec3) -> Entity;

    /// Spawn the kite body at `position`, tethered to `anchor`.
    fn spawn_payload(&mut self, template: &PayloadTemplate, position: Vec3, anchor: Entity) -> Entity;

    /// Create the joint binding `child` to `parent`.
    fn link(&mut self, child: Entity, parent: Entity, params: &JointParams);

    /// Re-point the existing joint on `child` at `parent`.
    fn retarget(&mut self, child: Entity, parent: Entity, params: &JointParams);

    /// Destroy `body` together with the joint it owns.
    fn destroy(&mut self, body: Entity);

    /// Current world position of `body`, if it exists.
    fn position(&self, body: Entity) -> Option<Vec3>;
}

/// A tether: anchor, ordered segments and the kite at the end.
#[derive(Component, Debug, Clone)]
pub struct Rope {
    anchor: Option<Entity>,
    segment_template: Option<SegmentTemplate>,
    payload_template: Option<PayloadTemplate>,
    segment_joint: JointParams,
    payload_joint: JointParams,
    segments: Vec<Entity>,
    payload: Option<Entity>,
}

impl Rope {
    pub fn new(
        anchor: Option<Entity>,
        segment_template: Option<SegmentTemplate>,
        payload_template: Option<PayloadTemplate>,
        segment_joint: JointParams,
        payload_joint: JointParams,
    ) -> Self {
        Self {
            anchor,
            segment_template,
            payload_template,
            segment_joint,
            payload_joint,
            segments: Vec::new(),
            payload: None,
        }
    }

    /// Rope with templates and joints taken from `config`.
    pub fn from_config(anchor: Option<Entity>, config: &KiteConfig) -> Self {
        let half = Vec3::Y * config.segment_length * 0.5;
        let segment_joint = JointParams {
            parent_anchor: half,
            child_anchor: -half,
            linear_limit: config.joint_linear_limit,
            spring: config.joint_spring,
            damper: config.joint_damper,
            swing_limit: Vec2::new(
                config.joint_swing_x_deg.to_radians(),
                config.joint_swing_z_deg.to_radians(),
            ),
        };
        let payload_joint = JointParams {
            parent_anchor: half,
            child_anchor: Vec3::from_array(config.kite_attach_offset),
            linear_limit: config.segment_length * config.payload_linear_limit_factor,
            spring: 0.0,
            damper: 0.0,
            swing_limit: Vec2::splat(config.payload_swing_limit_deg.to_radians()),
        };

        Self::new(
            anchor,
            Some(SegmentTemplate {
                length: config.segment_length,
                mass: config.segment_mass,
                radius: config.segment_radius,
            }),
            Some(PayloadTemplate {
                mass: config.kite_mass,
                half_extents: Vec3::from_array(config.kite_half_extents),
                rest_rotation: euler_degrees(config.kite_rest_euler_deg),
                spawn_height: config.segment_length * config.payload_spawn_factor,
            }),
            segment_joint,
            payload_joint,
        )
    }

    /// Create `initial_count` segments stacked above the anchor, then spawn
    /// the kite above the tail.  Returns the kite entity.
    pub fn build<B: RopeBackend>(
        &mut self,
        backend: &mut B,
        initial_count: usize,
    ) -> KiteResult<Entity> {
        if self.is_built() {
            return Err(KiteError::AlreadyBuilt);
        }
        let anchor = self.require_anchor()?;
        self.require_segment_template()?;
        let template = self
            .payload_template
            .ok_or(KiteError::MissingCollaborator {
                what: "payload template",
            })?;

        for _ in 0..initial_count {
            self.append_segment(backend)?;
        }

        let tail = self.tail_or(anchor);
        let base = backend
            .position(tail)
            .ok_or(KiteError::MissingCollaborator { what: "tail body" })?;
        let payload = backend.spawn_payload(&template, base + Vec3::Y * template.spawn_height, anchor);
        backend.link(payload, tail, &self.payload_joint_for(tail));
        self.payload = Some(payload);

        debug!("Rope built with {} segments", self.segments.len());
        Ok(payload)
    }

    /// Append one segment above the current tail and re-point the kite at it.
    pub fn append_segment<B: RopeBackend>(&mut self, backend: &mut B) -> KiteResult<Entity> {
        let anchor = self.require_anchor()?;
        let template = self.require_segment_template()?;

        let previous = self.tail_or(anchor);
        let base = backend
            .position(previous)
            .ok_or(KiteError::MissingCollaborator { what: "tail body" })?;

        let segment =
            backend.spawn_segment(self.segments.len(), &template, base + Vec3::Y * template.length);
        backend.link(segment, previous, &self.segment_joint);
        self.segments.push(segment);

        if let Some(payload) = self.payload {
            backend.retarget(payload, segment, &self.payload_joint_for(segment));
        }

        Ok(segment)
    }

    /// Append up to `count` segments.  Returns how many were actually added.
    pub fn append_segments<B: RopeBackend>(&mut self, backend: &mut B, count: usize) -> usize {
        let mut added = 0;
        for _ in 0..count {
            match self.append_segment(backend) {
                Ok(_) => added += 1,
                Err(e) => {
                    warn!("Stopped appending segments after {added}: {e}");
                    break;
                }
            }
        }
        added
    }

    /// Destroy the last segment and re-point the kite at the new tail.
    pub fn remove_last_segment<B: RopeBackend>(&mut self, backend: &mut B) -> KiteResult<()> {
        let Some(last) = self.segments.pop() else {
            return Err(KiteError::EmptyChain);
        };
        backend.destroy(last);

        if let Some(payload) = self.payload {
            let anchor = self.require_anchor()?;
            let tail = self.tail_or(anchor);
            backend.retarget(payload, tail, &self.payload_joint_for(tail));
        }

        Ok(())
    }

    /// Remove up to `count` segments, stopping early once the chain is empty.
    /// Returns how many were actually removed.
    pub fn remove_segments<B: RopeBackend>(&mut self, backend: &mut B, count: usize) -> usize {
        let mut removed = 0;
        while removed < count && self.remove_last_segment(backend).is_ok() {
            removed += 1;
        }
        removed
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The kite entity, once built.
    pub fn payload(&self) -> Option<Entity> {
        self.payload
    }

    pub fn anchor(&self) -> Option<Entity> {
        self.anchor
    }

    /// Read-only view of the segment bodies, anchor end first.
    pub fn segments(&self) -> &[Entity] {
        &self.segments
    }

    /// Spacing between segment centres.
    pub fn spacing(&self) -> f32 {
        self.segment_template.map_or(0.0, |t| t.length)
    }

    pub fn is_built(&self) -> bool {
        self.payload.is_some() || !self.segments.is_empty()
    }

    /// Positions from anchor through every segment to the kite, for drawing.
    ///
    /// Bodies that `locate` cannot find are skipped.
    pub fn snapshot(&self, locate: impl Fn(Entity) -> Option<Vec3>) -> Vec<Vec3> {
        self.anchor
            .into_iter()
            .chain(self.segments.iter().copied())
            .chain(self.payload)
            .filter_map(locate)
            .collect()
    }

    fn tail_or(&self, anchor: Entity) -> Entity {
        self.segments.last().copied().unwrap_or(anchor)
    }

    /// Kite joint for the given tail: segment tops take a half-spacing offset,
    /// the anchor none.
    fn payload_joint_for(&self, tail: Entity) -> JointParams {
        if Some(tail) == self.anchor {
            self.payload_joint.with_parent_anchor(Vec3::ZERO)
        } else {
            self.payload_joint
                .with_parent_anchor(Vec3::Y * self.spacing() * 0.5)
        }
    }

    fn require_anchor(&self) -> KiteResult<Entity> {
        self.anchor
            .ok_or(KiteError::MissingCollaborator { what: "anchor" })
    }

    fn require_segment_template(&self) -> KiteResult<SegmentTemplate> {
        self.segment_template
            .ok_or(KiteError::MissingCollaborator {
                what: "segment template",
            })
    }
}
