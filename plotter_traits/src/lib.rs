pub mod clock;
pub mod ui;

pub use clock::{Clock, MonotonicClock};
pub use ui::{Button, ButtonEdge, Message, UiSink, Widget};

use std::collections::BTreeSet;
use std::fmt;

/// Error type used at every trait boundary of the device layer.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Direction convention applied to duty cycle and speed set-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Normal,
    Inversed,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Normal => "normal",
            Polarity::Inversed => "inversed",
        }
    }
}

/// What the motor controller does once a positional run completes or `stop` is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopAction {
    #[default]
    Coast,
    Brake,
    Hold,
}

impl StopAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StopAction::Coast => "coast",
            StopAction::Brake => "brake",
            StopAction::Hold => "hold",
        }
    }
}

/// Set of state flags reported by a tacho motor (`running`, `stalled`, `holding`, ...).
///
/// The device layer reports these as one space-separated line; an empty line
/// means the motor is idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotorState {
    flags: BTreeSet<String>,
}

impl MotorState {
    pub const RUNNING: &'static str = "running";
    pub const STALLED: &'static str = "stalled";
    pub const HOLDING: &'static str = "holding";
    pub const OVERLOADED: &'static str = "overloaded";
    pub const RAMPING: &'static str = "ramping";

    /// Parse the space-separated flag line.
    pub fn parse(line: &str) -> Self {
        Self {
            flags: line.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_stalled(&self) -> bool {
        self.contains(Self::STALLED)
    }

    pub fn is_running(&self) -> bool {
        self.contains(Self::RUNNING)
    }

    pub fn is_idle(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for MotorState {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(str::to_owned).collect(),
        }
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in &self.flags {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(flag)?;
            first = false;
        }
        Ok(())
    }
}

/// Capability interface of one tacho motor, as exposed by the device layer.
///
/// Setters mirror the writable attributes of the motor; `run_direct`,
/// `run_to_absolute_position`, `stop` and `reset` issue commands. Reads take
/// `&self` because they do not change the commanded state.
pub trait Motor {
    fn reset(&mut self) -> HwResult<()>;
    fn set_polarity(&mut self, polarity: Polarity) -> HwResult<()>;
    /// Duty cycle in percent, signed (-100..=100).
    fn set_duty_cycle(&mut self, percent: i32) -> HwResult<()>;
    fn run_direct(&mut self) -> HwResult<()>;
    fn stop(&mut self) -> HwResult<()>;
    /// Speed set-point in encoder ticks per second.
    fn set_speed(&mut self, ticks_per_sec: i32) -> HwResult<()>;
    fn set_position_target(&mut self, position: i32) -> HwResult<()>;
    fn set_stop_action(&mut self, action: StopAction) -> HwResult<()>;
    fn run_to_absolute_position(&mut self) -> HwResult<()>;

    /// Live encoder position in raw ticks.
    fn position(&self) -> HwResult<i32>;
    fn state(&self) -> HwResult<MotorState>;
    fn connected(&self) -> bool;
}
