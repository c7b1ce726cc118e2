//! Position units and the raw ↔ normalized transforms.
//!
//! Raw positions are encoder ticks exactly as a motor reports them; which
//! direction counts up depends on how the axis is wired. Normalized positions
//! live on `0..=travel` for the calibrated interval of an axis, so callers
//! never need to know the raw direction. All transforms clamp: out-of-range
//! input is not an error.

use std::fmt;
use std::ops::{Add, Neg, Sub};

macro_rules! position_unit {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[inline]
            pub const fn new(v: i32) -> Self {
                Self(v)
            }

            #[inline]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

position_unit!(
    /// Native motor encoder ticks.
    RawPosition
);

position_unit!(
    /// Position on the `0..=travel` scale of a calibrated axis.
    NormalizedPosition
);

/// One of the three plotter motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Tool,
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Tool, Axis::X, Axis::Y];

    pub fn label(self) -> &'static str {
        match self {
            Axis::Tool => "tool",
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" | "z" => Some(Axis::Tool),
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            _ => None,
        }
    }

    /// Index into per-axis G-code tables (X, Y, Z order).
    pub fn gcode_index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Tool => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clamp `v` into the interval spanned by `a` and `b`, whichever is larger.
#[inline]
pub fn clamp_between(v: RawPosition, a: RawPosition, b: RawPosition) -> RawPosition {
    if a <= b { v.clamp(a, b) } else { v.clamp(b, a) }
}

/// Map a normalized position onto the raw interval that starts at `min`.
///
/// `min` is the raw position of normalized 0; `max` may be numerically
/// smaller than `min` on axes that count down.
pub fn to_raw(min: RawPosition, max: RawPosition, val: NormalizedPosition) -> RawPosition {
    if min < max {
        RawPosition(min.0.saturating_add(val.0)).clamp(min, max)
    } else {
        RawPosition(min.0.saturating_sub(val.0)).clamp(max, min)
    }
}

/// Map a raw position onto `0..=travel(min, max)`.
pub fn to_norm(min: RawPosition, max: RawPosition, val: RawPosition) -> NormalizedPosition {
    let n = if min < max {
        val.0
            .saturating_sub(min.0)
            .clamp(0, max.0.saturating_sub(min.0))
    } else {
        min.0
            .saturating_sub(val.0)
            .clamp(0, min.0.saturating_sub(max.0))
    };
    NormalizedPosition(n)
}

/// Distance between the two ends of a calibrated interval.
pub fn travel(min: RawPosition, max: RawPosition) -> NormalizedPosition {
    NormalizedPosition(max.0.saturating_sub(min.0).saturating_abs())
}

/// Named calibration limit recorded by one homing leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    ToolUp,
    ToolDown,
    XMin,
    XMax,
    YMin,
    YMax,
}

impl Limit {
    pub const ALL: [Limit; 6] = [
        Limit::ToolUp,
        Limit::ToolDown,
        Limit::XMin,
        Limit::XMax,
        Limit::YMin,
        Limit::YMax,
    ];

    /// Snake-case field name, e.g. `x_min`.
    pub fn name(self) -> &'static str {
        match self {
            Limit::ToolUp => "tool_up",
            Limit::ToolDown => "tool_down",
            Limit::XMin => "x_min",
            Limit::XMax => "x_max",
            Limit::YMin => "y_min",
            Limit::YMax => "y_max",
        }
    }
}

/// Raw stall positions recorded by a homing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBounds {
    pub tool_up: RawPosition,
    pub tool_down: RawPosition,
    pub x_min: RawPosition,
    pub x_max: RawPosition,
    pub y_min: RawPosition,
    pub y_max: RawPosition,
}

impl CalibrationBounds {
    pub fn get(&self, limit: Limit) -> RawPosition {
        match limit {
            Limit::ToolUp => self.tool_up,
            Limit::ToolDown => self.tool_down,
            Limit::XMin => self.x_min,
            Limit::XMax => self.x_max,
            Limit::YMin => self.y_min,
            Limit::YMax => self.y_max,
        }
    }

    pub fn set(&mut self, limit: Limit, pos: RawPosition) {
        let slot = match limit {
            Limit::ToolUp => &mut self.tool_up,
            Limit::ToolDown => &mut self.tool_down,
            Limit::XMin => &mut self.x_min,
            Limit::XMax => &mut self.x_max,
            Limit::YMin => &mut self.y_min,
            Limit::YMax => &mut self.y_max,
        };
        *slot = pos;
    }

    /// `(normalized 0, normalized travel)` ends of an axis.
    ///
    /// The tool axis counts from fully lowered, unlike X and Y which count
    /// from the first recorded limit.
    pub fn interval(&self, axis: Axis) -> (RawPosition, RawPosition) {
        match axis {
            Axis::X => (self.x_min, self.x_max),
            Axis::Y => (self.y_min, self.y_max),
            Axis::Tool => (self.tool_down, self.tool_up),
        }
    }

    pub fn travel(&self, axis: Axis) -> NormalizedPosition {
        let (min, max) = self.interval(axis);
        travel(min, max)
    }

    pub fn to_raw(&self, axis: Axis, val: NormalizedPosition) -> RawPosition {
        let (min, max) = self.interval(axis);
        to_raw(min, max, val)
    }

    pub fn to_norm(&self, axis: Axis, val: RawPosition) -> NormalizedPosition {
        let (min, max) = self.interval(axis);
        to_norm(min, max, val)
    }

    /// Human-readable summary shown after homing.
    pub fn report(&self) -> String {
        format!(
            "X: [{}, {}]-> {}\nY: [{}, {}]-> {}\nTool: [{}, {}]-> {}\n",
            self.x_min,
            self.x_max,
            self.travel(Axis::X),
            self.y_min,
            self.y_max,
            self.travel(Axis::Y),
            self.tool_up,
            self.tool_down,
            self.travel(Axis::Tool),
        )
    }
}

impl fmt::Display for CalibrationBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}
