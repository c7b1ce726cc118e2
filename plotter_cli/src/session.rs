//! Simulated plotter assembly and program execution on the scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use plotter_config::{Config, SimAxis, SimTravel};
use plotter_core::{
    Axis, CalibrationBounds, Command, MotionCfg, Outcome, Plotter, PlotterError, Priority,
    Scheduler, UnitsCfg, dispatch,
};
use plotter_hardware::{SimulatedMotor, Travel};
use plotter_traits::clock::{Clock, MonotonicClock};
use plotter_traits::{UiSink, Widget};
use plotter_ui::ConsoleUi;

pub type SimPlotter = Plotter<SimulatedMotor, ConsoleUi<Box<dyn Write>>>;

type Slot = Rc<RefCell<Option<Outcome<()>>>>;

pub const MAIN_MENU: &str = "main menu";
const STATUS_PRIORITY: Priority = Priority(10);
const STATUS_PERIOD: Duration = Duration::from_millis(100);

pub struct Session {
    plotter: SimPlotter,
    scheduler: Scheduler<SimPlotter>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

fn sim_motor(
    cfg: &Config,
    axis: SimAxis,
    travel: &SimTravel,
    clock: &Arc<dyn Clock + Send + Sync>,
) -> SimulatedMotor {
    SimulatedMotor::new(
        Axis::from(axis).label(),
        Travel::new(travel.lower, travel.upper, travel.start),
        cfg.sim.ticks_per_duty,
        Arc::clone(clock),
    )
    .with_connected(cfg.sim.is_connected(axis))
}

impl Session {
    /// Build simulated motors and the console UI from a validated config.
    pub fn from_config(cfg: &Config, out: Box<dyn Write>) -> Self {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
        let ui = ConsoleUi::new(out).with_auto_dismiss(cfg.ui.auto_dismiss);
        let motion: MotionCfg = (&cfg.motion).into();
        let units: UnitsCfg = (&cfg.units).into();

        tracing::debug!(
            go_speed = motion.go_speed,
            ticks_per_duty = cfg.sim.ticks_per_duty,
            "simulated plotter ready"
        );
        let mut plotter = Plotter::new(
            sim_motor(cfg, SimAxis::Tool, &cfg.sim.tool, &clock),
            sim_motor(cfg, SimAxis::X, &cfg.sim.x, &clock),
            sim_motor(cfg, SimAxis::Y, &cfg.sim.y, &clock),
            ui,
        )
        .with_motion(motion)
        .with_units(units);
        plotter.ui_mut().set_widget(Widget::screen(MAIN_MENU));
        Self {
            plotter,
            scheduler: Scheduler::with_clock(clock),
        }
    }

    /// The UI confirm button; pressing it cancels homing or a move.
    pub fn button(&self) -> Arc<AtomicBool> {
        self.plotter.ui().button()
    }

    pub fn plotter(&self) -> &SimPlotter {
        &self.plotter
    }

    pub fn bounds(&self) -> Option<&CalibrationBounds> {
        self.plotter.homed()
    }

    /// Fail fast when a motor is unplugged.
    pub fn ensure_connected(&self) -> plotter_core::Result<()> {
        let missing = self.plotter.disconnected_axes();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlotterError::NotConnected(missing).into())
        }
    }

    /// Dispatch `program` one command at a time and run the scheduler until
    /// nothing is left. A status task redraws the position overlay meanwhile.
    pub fn run_program(&mut self, program: Vec<Command>) -> plotter_core::Result<()> {
        let slot: Slot = Rc::default();
        let Self {
            plotter: p,
            scheduler: s,
        } = self;

        run_next(p, s, program.into(), Rc::clone(&slot))?;
        s.schedule_with_priority(STATUS_PRIORITY, status_task);
        s.run(p)?;

        let outcome = slot.borrow_mut().take();
        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(e.into()),
            // a cancelled go never replies
            None => Err(PlotterError::MoveCancelled.into()),
        }
    }
}

fn run_next(
    p: &mut SimPlotter,
    s: &mut Scheduler<SimPlotter>,
    mut rest: VecDeque<Command>,
    slot: Slot,
) -> plotter_core::Result<()> {
    let Some(command) = rest.pop_front() else {
        *slot.borrow_mut() = Some(Ok(()));
        return Ok(());
    };
    let name = command.name();
    tracing::info!(command = name, remaining = rest.len(), "run");
    dispatch(
        p,
        s,
        command,
        Widget::screen(MAIN_MENU),
        move |p: &mut SimPlotter, s: &mut Scheduler<SimPlotter>, outcome: Outcome<()>| {
            match outcome {
                Ok(()) => run_next(p, s, rest, slot),
                Err(e) => {
                    tracing::warn!(command = name, error = %e, "command failed");
                    *slot.borrow_mut() = Some(Err(e));
                    Ok(())
                }
            }
        },
    )
}

// Stops once it is the only task left.
fn status_task(p: &mut SimPlotter, s: &mut Scheduler<SimPlotter>) -> plotter_core::Result<()> {
    let line = p.status_line()?;
    p.ui_mut().show_status(&line);
    if !s.is_idle() {
        s.schedule_with(STATUS_PRIORITY, STATUS_PERIOD, status_task);
    }
    Ok(())
}

/// Commands for `go`: home first, then set units and positioning, then move.
pub fn go_program(
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    relative: bool,
    inches: bool,
) -> Vec<Command> {
    vec![
        Command::Home,
        if inches {
            Command::UseInches
        } else {
            Command::UseMillimeters
        },
        if relative {
            Command::RelativePositioning
        } else {
            Command::AbsolutePositioning
        },
        Command::Go { x, y, z },
    ]
}
