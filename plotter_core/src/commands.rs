//! G-code level commands: unit/positioning modes, homing and moves.

use plotter_traits::{Motor, UiSink, Widget};

use crate::error::{Outcome, PlotterError, Result};
use crate::go::{MoveTargets, go};
use crate::homing::home;
use crate::plotter::Plotter;
use crate::scheduler::Scheduler;
use crate::units::{Axis, NormalizedPosition, RawPosition};

/// Modal G-code state that changes how `Go` coordinates are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GCodeState {
    pub relative_moves: bool,
    pub use_mm: bool,
}

impl Default for GCodeState {
    fn default() -> Self {
        Self {
            relative_moves: false,
            use_mm: true,
        }
    }
}

/// An already-parsed G-code command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move to (or by, in relative mode) the given coordinates; `z` is the tool.
    Go {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    },
    Home,
    UseMillimeters,
    UseInches,
    AbsolutePositioning,
    RelativePositioning,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Go { .. } => "go",
            Command::Home => "home",
            Command::UseMillimeters => "use-mm",
            Command::UseInches => "use-inches",
            Command::AbsolutePositioning => "absolute",
            Command::RelativePositioning => "relative",
        }
    }
}

/// Raw target for one `Go` coordinate given in the current unit system.
///
/// The coordinate is truncated to whole normalized steps; in relative mode it
/// is added to the live position of the axis.
pub fn coordinate_to_raw<M: Motor, U: UiSink>(
    p: &Plotter<M, U>,
    axis: Axis,
    value: f64,
) -> Result<RawPosition> {
    let bounds = *p
        .homed()
        .ok_or_else(|| eyre::Report::new(PlotterError::NotHomed))?;
    let gcode = p.gcode();
    let per_step = p.units().per_step(axis, gcode.use_mm);
    // float to int `as` saturates and maps NaN to 0
    let steps = NormalizedPosition::new((value / per_step) as i32);
    let norm = if gcode.relative_moves {
        p.advance_axis(axis, steps)?
    } else {
        steps
    };
    Ok(bounds.to_raw(axis, norm))
}

fn targets_for<M: Motor, U: UiSink>(
    p: &Plotter<M, U>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
) -> Result<MoveTargets> {
    let resolve = |axis: Axis, v: Option<f64>| v.map(|v| coordinate_to_raw(p, axis, v)).transpose();
    Ok(MoveTargets {
        x: resolve(Axis::X, x)?,
        y: resolve(Axis::Y, y)?,
        tool: resolve(Axis::Tool, z)?,
    })
}

/// Execute one command and report its outcome through `reply`.
///
/// Mode changes reply at once. `Home` and `Go` reply when the motion they
/// start has finished; a cancelled `Go` never replies. `previous` is the
/// screen to restore after homing.
pub fn dispatch<M, U, R>(
    p: &mut Plotter<M, U>,
    s: &mut Scheduler<Plotter<M, U>>,
    command: Command,
    previous: Widget,
    reply: R,
) -> Result<()>
where
    M: Motor,
    U: UiSink,
    R: FnOnce(&mut Plotter<M, U>, &mut Scheduler<Plotter<M, U>>, Outcome<()>) -> Result<()> + 'static,
{
    tracing::debug!(command = command.name(), "dispatch");
    match command {
        Command::Go { x, y, z } => {
            if p.homed().is_none() {
                tracing::warn!("can't go, not homed");
                return reply(p, s, Err(PlotterError::NotHomed));
            }
            let targets = targets_for(p, x, y, z)?;
            go(p, s, targets, move |p, s| reply(p, s, Ok(())))
        }
        Command::Home => {
            home(p, s, previous, move |p, s, outcome| match outcome {
                Ok(bounds) => {
                    p.set_homed(bounds);
                    reply(p, s, Ok(()))
                }
                Err(e) => reply(p, s, Err(e)),
            });
            Ok(())
        }
        Command::UseMillimeters => {
            p.gcode_mut().use_mm = true;
            reply(p, s, Ok(()))
        }
        Command::UseInches => {
            p.gcode_mut().use_mm = false;
            reply(p, s, Ok(()))
        }
        Command::AbsolutePositioning => {
            p.gcode_mut().relative_moves = false;
            reply(p, s, Ok(()))
        }
        Command::RelativePositioning => {
            p.gcode_mut().relative_moves = true;
            reply(p, s, Ok(()))
        }
    }
}
