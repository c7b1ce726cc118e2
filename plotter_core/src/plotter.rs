//! The plotter context every scheduled action works on.

use plotter_traits::{Motor, UiSink};

use crate::commands::GCodeState;
use crate::config::{MotionCfg, UnitsCfg};
use crate::error::{PlotterError, Result};
use crate::hw_error::HwResultExt;
use crate::units::{Axis, CalibrationBounds, NormalizedPosition, RawPosition, clamp_between};

/// Motors, display and calibration of one plotter.
///
/// Owned by the control loop and handed to every scheduled action as
/// `&mut Plotter`; nothing else writes to it.
#[derive(Debug)]
pub struct Plotter<M, U> {
    tool: M,
    x: M,
    y: M,
    ui: U,
    homed: Option<CalibrationBounds>,
    gcode: GCodeState,
    motion: MotionCfg,
    units: UnitsCfg,
}

impl<M: Motor, U: UiSink> Plotter<M, U> {
    pub fn new(tool: M, x: M, y: M, ui: U) -> Self {
        Self {
            tool,
            x,
            y,
            ui,
            homed: None,
            gcode: GCodeState::default(),
            motion: MotionCfg::default(),
            units: UnitsCfg::default(),
        }
    }

    pub fn with_motion(mut self, motion: MotionCfg) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_units(mut self, units: UnitsCfg) -> Self {
        self.units = units;
        self
    }

    pub fn motor(&self, axis: Axis) -> &M {
        match axis {
            Axis::Tool => &self.tool,
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn motor_mut(&mut self, axis: Axis) -> &mut M {
        match axis {
            Axis::Tool => &mut self.tool,
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn homed(&self) -> Option<&CalibrationBounds> {
        self.homed.as_ref()
    }

    /// Replace the calibration with a fresh homing result.
    pub fn set_homed(&mut self, bounds: CalibrationBounds) {
        self.homed = Some(bounds);
    }

    pub fn gcode(&self) -> &GCodeState {
        &self.gcode
    }

    pub fn gcode_mut(&mut self) -> &mut GCodeState {
        &mut self.gcode
    }

    pub fn motion(&self) -> &MotionCfg {
        &self.motion
    }

    pub fn units(&self) -> &UnitsCfg {
        &self.units
    }

    /// Axes whose motor is not plugged in, in tool, x, y order.
    pub fn disconnected_axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|a| !self.motor(*a).connected())
            .collect()
    }

    fn bounds(&self) -> Result<&CalibrationBounds> {
        self.homed
            .as_ref()
            .ok_or_else(|| eyre::Report::new(PlotterError::NotHomed))
    }

    /// Live encoder position of one axis.
    pub fn read_raw(&self, axis: Axis) -> Result<RawPosition> {
        self.motor(axis).position().hw().map(RawPosition::new)
    }

    /// Live position of one axis on its calibrated `0..=travel` scale.
    pub fn read_axis(&self, axis: Axis) -> Result<NormalizedPosition> {
        let bounds = self.bounds()?;
        let raw = self.read_raw(axis)?;
        Ok(bounds.to_norm(axis, raw))
    }

    /// Current position of `axis` moved by `by`, clamped to the calibrated range.
    pub fn advance_axis<P: AxisUnit>(&self, axis: Axis, by: P) -> Result<P> {
        P::advance(self, axis, by)
    }

    /// Overlay text `[tool|x,y]`.
    ///
    /// Shows normalized positions once homed; before that `?` for a connected
    /// motor and `x` for a missing one.
    pub fn status_line(&self) -> Result<String> {
        if self.homed.is_some() {
            Ok(format!(
                "[{}|{},{}]",
                self.read_axis(Axis::Tool)?,
                self.read_axis(Axis::X)?,
                self.read_axis(Axis::Y)?
            ))
        } else {
            let mark = |axis: Axis| if self.motor(axis).connected() { '?' } else { 'x' };
            Ok(format!(
                "[{}|{},{}]",
                mark(Axis::Tool),
                mark(Axis::X),
                mark(Axis::Y)
            ))
        }
    }
}

/// Position unit that an axis can be advanced in.
pub trait AxisUnit: Sized {
    fn advance<M: Motor, U: UiSink>(plotter: &Plotter<M, U>, axis: Axis, by: Self) -> Result<Self>;
}

impl AxisUnit for NormalizedPosition {
    fn advance<M: Motor, U: UiSink>(plotter: &Plotter<M, U>, axis: Axis, by: Self) -> Result<Self> {
        let travel = plotter.bounds()?.travel(axis);
        let here = plotter.read_axis(axis)?;
        Ok(Self::new(here.get().saturating_add(by.get()).clamp(0, travel.get())))
    }
}

impl AxisUnit for RawPosition {
    fn advance<M: Motor, U: UiSink>(plotter: &Plotter<M, U>, axis: Axis, by: Self) -> Result<Self> {
        let (a, b) = plotter.bounds()?.interval(axis);
        let here = plotter.read_raw(axis)?;
        Ok(clamp_between(
            Self::new(here.get().saturating_add(by.get())),
            a,
            b,
        ))
    }
}
