//! Simulated tacho motors for running the plotter without the device layer.
//!
//! A `SimulatedMotor` integrates its commanded velocity over the time reported
//! by a `Clock`, so a manual test clock drives it deterministically. Physical
//! travel is bounded; pushing against a bound reports `running stalled`,
//! which is what homing looks for.

pub mod error;

use std::cell::Cell;
use std::sync::Arc;
use std::time::Instant;

use plotter_traits::{Clock, HwResult, Motor, MotorState, Polarity, StopAction};

use crate::error::HwError;

/// Physical travel of one simulated axis, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Travel {
    pub lower: i32,
    pub upper: i32,
    /// Where the carriage sits at power-on.
    pub start: i32,
}

impl Travel {
    pub fn new(lower: i32, upper: i32, start: i32) -> Self {
        Self {
            lower,
            upper,
            start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drive {
    Idle,
    Holding,
    Direct,
    ToTarget,
}

/// Simulated motor implementation
pub struct SimulatedMotor {
    name: String,
    travel: Travel,
    ticks_per_duty: f64,
    connected: bool,
    clock: Arc<dyn Clock + Send + Sync>,

    physical: Cell<f64>,
    // physical position at which the encoder reads 0
    zero: Cell<f64>,
    drive: Cell<Drive>,
    stalled: Cell<bool>,
    last_update: Cell<Instant>,

    duty: Cell<i32>,
    speed: Cell<i32>,
    target: Cell<i32>,
    polarity: Cell<Polarity>,
    stop_action: Cell<StopAction>,
}

impl core::fmt::Debug for SimulatedMotor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedMotor")
            .field("name", &self.name)
            .field("physical", &self.physical.get())
            .field("drive", &self.drive.get())
            .field("stalled", &self.stalled.get())
            .finish()
    }
}

impl SimulatedMotor {
    /// `ticks_per_duty` is the free-running speed (ticks/s) per duty-cycle percent.
    pub fn new(
        name: impl Into<String>,
        travel: Travel,
        ticks_per_duty: f64,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let now = clock.now();
        let start = f64::from(travel.start.clamp(travel.lower, travel.upper));
        Self {
            name: name.into(),
            travel,
            ticks_per_duty,
            connected: true,
            clock,
            physical: Cell::new(start),
            zero: Cell::new(start),
            drive: Cell::new(Drive::Idle),
            stalled: Cell::new(false),
            last_update: Cell::new(now),
            duty: Cell::new(0),
            speed: Cell::new(0),
            target: Cell::new(0),
            polarity: Cell::new(Polarity::Normal),
            stop_action: Cell::new(StopAction::Coast),
        }
    }

    /// Mark the motor as unplugged; every command then fails.
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Carriage position in physical ticks, independent of encoder resets.
    pub fn physical_position(&self) -> i32 {
        self.update();
        self.physical.get().round() as i32
    }

    fn sign(&self) -> f64 {
        match self.polarity.get() {
            Polarity::Normal => 1.0,
            Polarity::Inversed => -1.0,
        }
    }

    fn ensure_connected(&self) -> Result<(), HwError> {
        if self.connected {
            Ok(())
        } else {
            Err(HwError::Disconnected(self.name.clone()))
        }
    }

    /// Move to `next`, clamping at the physical bounds. Returns true when clamped.
    fn move_physical(&self, next: f64) -> bool {
        let lower = f64::from(self.travel.lower);
        let upper = f64::from(self.travel.upper);
        if next < lower {
            self.physical.set(lower);
            true
        } else if next > upper {
            self.physical.set(upper);
            true
        } else {
            self.physical.set(next);
            false
        }
    }

    fn update(&self) {
        let now = self.clock.now();
        let dt = now
            .saturating_duration_since(self.last_update.get())
            .as_secs_f64();
        self.last_update.set(now);
        if dt == 0.0 {
            return;
        }

        match self.drive.get() {
            Drive::Direct => {
                let velocity = self.sign() * f64::from(self.duty.get()) * self.ticks_per_duty;
                if velocity != 0.0 && self.move_physical(self.physical.get() + velocity * dt) {
                    self.stalled.set(true);
                }
            }
            Drive::ToTarget => {
                let goal = self.zero.get() + self.sign() * f64::from(self.target.get());
                let here = self.physical.get();
                let step = f64::from(self.speed.get().unsigned_abs()) * dt;
                let dist = goal - here;
                if dist.abs() <= step {
                    if self.move_physical(goal) {
                        self.stalled.set(true);
                    } else {
                        self.drive.set(self.resting_drive());
                        self.stalled.set(false);
                    }
                } else if self.move_physical(here + step * dist.signum()) {
                    self.stalled.set(true);
                }
            }
            Drive::Idle | Drive::Holding => {}
        }
    }

    fn resting_drive(&self) -> Drive {
        if self.stop_action.get() == StopAction::Hold {
            Drive::Holding
        } else {
            Drive::Idle
        }
    }

    fn encoder_position(&self) -> i32 {
        (self.sign() * (self.physical.get() - self.zero.get())).round() as i32
    }
}

impl Motor for SimulatedMotor {
    fn reset(&mut self) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.drive.set(Drive::Idle);
        self.stalled.set(false);
        self.zero.set(self.physical.get());
        self.duty.set(0);
        self.speed.set(0);
        self.target.set(0);
        self.polarity.set(Polarity::Normal);
        self.stop_action.set(StopAction::Coast);
        tracing::debug!(motor = %self.name, "reset");
        Ok(())
    }

    fn set_polarity(&mut self, polarity: Polarity) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.polarity.set(polarity);
        Ok(())
    }

    fn set_duty_cycle(&mut self, percent: i32) -> HwResult<()> {
        self.ensure_connected()?;
        if !(-100..=100).contains(&percent) {
            return Err(Box::new(HwError::InvalidValue(format!(
                "duty cycle {percent} outside -100..=100"
            ))));
        }
        self.update();
        self.duty.set(percent);
        Ok(())
    }

    fn run_direct(&mut self) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.drive.set(Drive::Direct);
        self.stalled.set(false);
        tracing::debug!(motor = %self.name, duty = self.duty.get(), "run-direct");
        Ok(())
    }

    fn stop(&mut self) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.drive.set(self.resting_drive());
        self.stalled.set(false);
        tracing::debug!(motor = %self.name, "stop");
        Ok(())
    }

    fn set_speed(&mut self, ticks_per_sec: i32) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.speed.set(ticks_per_sec);
        Ok(())
    }

    fn set_position_target(&mut self, position: i32) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.target.set(position);
        Ok(())
    }

    fn set_stop_action(&mut self, action: StopAction) -> HwResult<()> {
        self.ensure_connected()?;
        self.stop_action.set(action);
        Ok(())
    }

    fn run_to_absolute_position(&mut self) -> HwResult<()> {
        self.ensure_connected()?;
        self.update();
        self.drive.set(Drive::ToTarget);
        self.stalled.set(false);
        tracing::debug!(
            motor = %self.name,
            target = self.target.get(),
            speed = self.speed.get(),
            "run-to-abs-pos"
        );
        Ok(())
    }

    fn position(&self) -> HwResult<i32> {
        self.ensure_connected()?;
        self.update();
        Ok(self.encoder_position())
    }

    fn state(&self) -> HwResult<MotorState> {
        self.ensure_connected()?;
        self.update();
        let state = match (self.drive.get(), self.stalled.get()) {
            (Drive::Direct | Drive::ToTarget, true) => {
                MotorState::from_iter([MotorState::RUNNING, MotorState::STALLED])
            }
            (Drive::Direct | Drive::ToTarget, false) => MotorState::from_iter([MotorState::RUNNING]),
            (Drive::Holding, _) => MotorState::from_iter([MotorState::HOLDING]),
            (Drive::Idle, _) => MotorState::default(),
        };
        Ok(state)
    }

    fn connected(&self) -> bool {
        self.connected
    }
}
