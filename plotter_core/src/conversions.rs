//! `From` implementations bridging `plotter_config` types to `plotter_core` types.

use std::time::Duration;

use crate::config::{MotionCfg, UnitsCfg};
use crate::units::Axis;

// ── MotionCfg ────────────────────────────────────────────────────────────────

impl From<&plotter_config::MotionCfg> for MotionCfg {
    fn from(c: &plotter_config::MotionCfg) -> Self {
        Self {
            go_speed: c.go_speed,
            go_poll: Duration::from_millis(c.go_poll_ms),
            homing_poll: Duration::from_millis(c.homing_poll_ms),
            spin_up: Duration::from_millis(c.spin_up_ms),
        }
    }
}

// ── UnitsCfg ─────────────────────────────────────────────────────────────────

impl From<&plotter_config::UnitsCfg> for UnitsCfg {
    fn from(c: &plotter_config::UnitsCfg) -> Self {
        Self {
            mm_per_step: c.mm_per_step,
            inches_per_step: c.inches_per_step,
        }
    }
}

// ── Axis ─────────────────────────────────────────────────────────────────────

impl From<plotter_config::SimAxis> for Axis {
    fn from(a: plotter_config::SimAxis) -> Self {
        match a {
            plotter_config::SimAxis::Tool => Axis::Tool,
            plotter_config::SimAxis::X => Axis::X,
            plotter_config::SimAxis::Y => Axis::Y,
        }
    }
}

impl From<Axis> for plotter_config::SimAxis {
    fn from(a: Axis) -> Self {
        match a {
            Axis::Tool => plotter_config::SimAxis::Tool,
            Axis::X => plotter_config::SimAxis::X,
            Axis::Y => plotter_config::SimAxis::Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_durations_come_from_milliseconds() {
        let cfg = plotter_config::MotionCfg {
            go_speed: 150,
            go_poll_ms: 50,
            homing_poll_ms: 7,
            spin_up_ms: 0,
        };
        let m = MotionCfg::from(&cfg);
        assert_eq!(m.go_speed, 150);
        assert_eq!(m.go_poll, Duration::from_millis(50));
        assert_eq!(m.homing_poll, Duration::from_millis(7));
        assert!(m.spin_up.is_zero());
    }

    #[test]
    fn defaults_agree() {
        assert_eq!(
            MotionCfg::from(&plotter_config::MotionCfg::default()),
            MotionCfg::default()
        );
        assert_eq!(
            UnitsCfg::from(&plotter_config::UnitsCfg::default()),
            UnitsCfg::default()
        );
    }
}
