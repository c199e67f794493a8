//! Rope module: the segmented tether between a fixed anchor and the kite.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`chain`] | `Rope` bookkeeping (build, append, remove, snapshot) over the `RopeBackend` trait |
//! | [`backend`] | `CommandsBackend`: Rapier bodies and joints spawned through `Commands` |
//! | [`monitor`] | `HeightMonitor`: grows (and optionally shrinks) the rope with kite altitude |
//! | [`collision`] | Logs and publishes contacts between segments of different ropes |
//!
//! Only [`Rope`] mutates chain topology.  Everything else reads it through
//! accessors or the `snapshot` position list.

pub mod backend;
pub mod chain;
pub mod collision;
pub mod monitor;

pub use backend::{generic_joint, CommandsBackend, RopeAnchor, RopeSegment};
pub use chain::{JointParams, PayloadTemplate, Rope, RopeBackend, RopeOwner, SegmentTemplate};
pub use collision::{rope_collision_report_system, RopeCrossing};
pub use monitor::{segment_count_system, HeightMonitor, SegmentPlan};
