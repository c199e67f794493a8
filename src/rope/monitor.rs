//! Segment count controller: grows the rope as the kite climbs.
//!
//! The controller subscribes to [`LiftReport`] messages published by the
//! lift/wind driver after every physics step.  The first report for a rope
//! only records the reference altitude.  After that, every full `height_step`
//! of climb above the reference asks for one more segment, limited per tick by
//! `max_segments_per_tick` and overall by the kite's lift capacity.
//!
//! The reference altitude advances by the *attempted* growth even when the
//! capacity allows none, so a capped kite does not retry every tick.
//!
//! Shrinking on descent is available behind `enable_shrink_on_descent` and is
//! off by default.

use super::backend::CommandsBackend;
use super::chain::Rope;
use crate::config::KiteConfig;
use crate::kite::LiftReport;
use bevy::prelude::*;

/// What the controller wants done to the chain this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPlan {
    Hold,
    Grow(usize),
    Shrink(usize),
}

/// Per-rope controller state.  Lives on the rope entity next to [`Rope`].
#[derive(Component, Debug, Clone, Default)]
pub struct HeightMonitor {
    reference: Option<f32>,
    inert: bool,
}

impl HeightMonitor {
    /// Altitude that growth is measured against, once the kite has been seen.
    pub fn reference(&self) -> Option<f32> {
        self.reference
    }

    /// `true` once the controller has disabled itself for lack of a rope.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Feed one altitude sample and decide what to do with the chain.
    pub fn observe(
        &mut self,
        altitude: f32,
        capacity: usize,
        segment_count: usize,
        config: &KiteConfig,
    ) -> SegmentPlan {
        let Some(reference) = self.reference else {
            self.reference = Some(altitude);
            return SegmentPlan::Hold;
        };

        let step = config.height_step;
        let delta = altitude - reference;

        if delta >= step {
            let steps = ((delta / step).floor() as usize).clamp(1, config.max_segments_per_tick);
            let allowed = capacity.saturating_sub(segment_count);
            let to_add = steps.min(allowed);

            if to_add > 0 {
                self.reference = Some(reference + to_add as f32 * step);
                SegmentPlan::Grow(to_add)
            } else {
                self.reference = Some(reference + steps as f32 * step);
                SegmentPlan::Hold
            }
        } else if config.enable_shrink_on_descent && delta <= -step {
            let steps = ((-delta / step).floor() as usize).clamp(1, config.max_segments_per_tick);
            let allowed = segment_count.saturating_sub(config.min_segments);
            let to_remove = steps.min(allowed);

            if to_remove > 0 {
                self.reference = Some(reference - to_remove as f32 * step);
                SegmentPlan::Shrink(to_remove)
            } else {
                self.reference = Some(reference - steps as f32 * step);
                SegmentPlan::Hold
            }
        } else {
            SegmentPlan::Hold
        }
    }
}

/// Apply lift reports to their ropes.
///
/// Runs after the physics writeback so altitudes reflect the step that just
/// finished.  Segment edits are queued as commands and land before the next
/// step.
pub fn segment_count_system(
    mut commands: Commands,
    mut reports: MessageReader<LiftReport>,
    mut ropes: Query<(&mut HeightMonitor, Option<&mut Rope>)>,
    transforms: Query<&Transform>,
    config: Res<KiteConfig>,
) {
    for report in reports.read() {
        let Ok((mut monitor, rope)) = ropes.get_mut(report.rope) else {
            continue;
        };
        if monitor.inert {
            continue;
        }
        let Some(mut rope) = rope else {
            error!(
                "HeightMonitor on {:?} has no Rope to control; disabling it",
                report.rope
            );
            monitor.inert = true;
            continue;
        };

        let plan = monitor.observe(
            report.altitude,
            report.capacity,
            rope.segment_count(),
            &config,
        );

        let mut backend = CommandsBackend::new(&mut commands, report.rope, &config, |e| {
            transforms.get(e).ok().map(|t| t.translation)
        });
        match plan {
            SegmentPlan::Hold => {}
            SegmentPlan::Grow(n) => {
                let added = rope.append_segments(&mut backend, n);
                debug!(
                    "Rope {:?}: +{added} segments (now {})",
                    report.rope,
                    rope.segment_count()
                );
            }
            SegmentPlan::Shrink(n) => {
                let removed = rope.remove_segments(&mut backend, n);
                debug!(
                    "Rope {:?}: -{removed} segments (now {})",
                    report.rope,
                    rope.segment_count()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primed(reference: f32) -> HeightMonitor {
        HeightMonitor {
            reference: Some(reference),
            inert: false,
        }
    }

    #[test]
    fn first_sample_only_records_reference() {
        let mut monitor = HeightMonitor::default();
        let plan = monitor.observe(50.0, 10, 3, &KiteConfig::default());
        assert_eq!(plan, SegmentPlan::Hold);
        assert_eq!(monitor.reference(), Some(50.0));
    }

    #[test]
    fn one_step_of_climb_adds_one_segment() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(1.14);
        assert_eq!(monitor.observe(11.2, 10, 3, &cfg), SegmentPlan::Grow(1));
        let reference = monitor.reference().unwrap();
        assert!((reference - 11.14).abs() < 1e-4);
    }

    #[test]
    fn climb_below_step_does_nothing() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(0.0);
        assert_eq!(monitor.observe(9.99, 10, 3, &cfg), SegmentPlan::Hold);
        assert_eq!(monitor.reference(), Some(0.0));
    }

    #[test]
    fn growth_is_clamped_per_tick() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(0.0);
        assert_eq!(monitor.observe(95.0, 100, 3, &cfg), SegmentPlan::Grow(3));
        assert_eq!(monitor.reference(), Some(30.0));
    }

    #[test]
    fn growth_is_clamped_to_capacity() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(0.0);
        // Three steps of climb, but room for only one more segment.
        assert_eq!(monitor.observe(30.0, 4, 3, &cfg), SegmentPlan::Grow(1));
        assert_eq!(monitor.reference(), Some(10.0));
    }

    #[test]
    fn exhausted_capacity_still_advances_reference() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(0.0);
        // capacity 2, length 5, three steps requested
        assert_eq!(monitor.observe(30.0, 2, 5, &cfg), SegmentPlan::Hold);
        assert_eq!(monitor.reference(), Some(30.0));
        // and does not retry on the next tick at the same altitude
        assert_eq!(monitor.observe(30.0, 2, 5, &cfg), SegmentPlan::Hold);
    }

    #[test]
    fn descent_is_ignored_by_default() {
        let cfg = KiteConfig::default();
        let mut monitor = primed(50.0);
        assert_eq!(monitor.observe(10.0, 10, 6, &cfg), SegmentPlan::Hold);
        assert_eq!(monitor.reference(), Some(50.0));
    }

    #[test]
    fn descent_shrinks_down_to_minimum_when_enabled() {
        let cfg = KiteConfig {
            enable_shrink_on_descent: true,
            ..Default::default()
        };
        let mut monitor = primed(50.0);
        // two steps down, five segments, minimum three → remove two
        assert_eq!(monitor.observe(30.0, 10, 5, &cfg), SegmentPlan::Shrink(2));
        assert_eq!(monitor.reference(), Some(30.0));

        // already at minimum: nothing removed, reference still follows
        assert_eq!(monitor.observe(20.0, 10, 3, &cfg), SegmentPlan::Hold);
        assert_eq!(monitor.reference(), Some(20.0));
    }
}
