//! Runtime configuration used by the motion state machines.
//!
//! Separate from the TOML-deserialized config in `plotter_config`; see
//! `conversions` for the bridge.

use std::time::Duration;

use crate::units::Axis;

/// Timing and speed of homing and coordinated moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionCfg {
    /// Speed set-point for coordinated moves (ticks/s).
    pub go_speed: i32,
    /// Interval between "target reached?" polls of a coordinated move.
    pub go_poll: Duration,
    /// Interval between stall polls while homing.
    pub homing_poll: Duration,
    /// Grace period after starting a homing leg before stall is checked,
    /// so the motor is moving before the first look.
    pub spin_up: Duration,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            go_speed: 200,
            go_poll: Duration::from_millis(200),
            homing_poll: Duration::from_millis(10),
            spin_up: Duration::from_millis(300),
        }
    }
}

/// Length of one normalized step, indexed X, Y, tool.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitsCfg {
    pub mm_per_step: [f64; 3],
    pub inches_per_step: [f64; 3],
}

impl Default for UnitsCfg {
    fn default() -> Self {
        Self {
            mm_per_step: [0.1, 0.1, 0.1],
            inches_per_step: [0.00397, 0.00397, 0.00397],
        }
    }
}

impl UnitsCfg {
    pub fn per_step(&self, axis: Axis, use_mm: bool) -> f64 {
        let table = if use_mm {
            &self.mm_per_step
        } else {
            &self.inches_per_step
        };
        table[axis.gcode_index()]
    }
}
