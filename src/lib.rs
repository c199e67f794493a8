//! Patang: a kite-flying simulation on a segmented tether.
//!
//! A kite climbs on ramping lift at the end of a rope made of jointed rigid
//! segments.  The rope grows as the kite gains altitude, the player can hold
//! the line to make the kite circle the anchor, and can pull to dive.

pub mod config;
pub mod constants;
pub mod error;
pub mod kite;
pub mod rendering;
pub mod rope;
pub mod simulation;
pub mod spawner;
