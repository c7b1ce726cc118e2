//! Coordinated absolute move of up to three axes.

use plotter_traits::{Motor, StopAction, UiSink};

use crate::error::Result;
use crate::hw_error::HwResultExt;
use crate::plotter::Plotter;
use crate::scheduler::Scheduler;
use crate::units::{Axis, RawPosition};

/// Raw target per axis; `None` leaves the axis alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveTargets {
    pub x: Option<RawPosition>,
    pub y: Option<RawPosition>,
    pub tool: Option<RawPosition>,
}

impl MoveTargets {
    /// Present targets in x, y, tool order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, RawPosition)> + use<> {
        [(Axis::X, self.x), (Axis::Y, self.y), (Axis::Tool, self.tool)]
            .into_iter()
            .filter_map(|(axis, t)| t.map(|t| (axis, t)))
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.tool.is_none()
    }
}

struct CoordinatedMove<F> {
    targets: MoveTargets,
    done: F,
}

impl<F> CoordinatedMove<F> {
    fn tick<M, U>(self, p: &mut Plotter<M, U>, s: &mut Scheduler<Plotter<M, U>>) -> Result<()>
    where
        M: Motor,
        U: UiSink,
        F: FnOnce(&mut Plotter<M, U>, &mut Scheduler<Plotter<M, U>>) -> Result<()> + 'static,
    {
        if p.ui_mut().take_confirm() {
            // motors keep running towards their targets
            tracing::warn!(targets = ?self.targets, "coordinated move cancelled");
            return Ok(());
        }

        for (axis, target) in self.targets.iter() {
            let here = p.read_raw(axis)?;
            if here != target {
                tracing::debug!(axis = %axis, raw = here.get(), target = target.get(), "not there yet");
                let poll = p.motion().go_poll;
                s.schedule_after(poll, move |p, s| self.tick(p, s));
                return Ok(());
            }
        }

        tracing::info!(targets = ?self.targets, "coordinated move finished");
        (self.done)(p, s)
    }
}

/// Start all targeted axes towards their raw targets at once and call
/// `done` when every one of them reads its target exactly.
///
/// A confirm press seen on a poll stops polling: `done` is never called and
/// no further motor commands are sent.
pub fn go<M, U, F>(
    p: &mut Plotter<M, U>,
    s: &mut Scheduler<Plotter<M, U>>,
    targets: MoveTargets,
    done: F,
) -> Result<()>
where
    M: Motor,
    U: UiSink,
    F: FnOnce(&mut Plotter<M, U>, &mut Scheduler<Plotter<M, U>>) -> Result<()> + 'static,
{
    let speed = p.motion().go_speed;
    for (axis, target) in targets.iter() {
        let motor = p.motor_mut(axis);
        motor.set_stop_action(StopAction::Hold).hw()?;
        motor.set_speed(speed).hw()?;
        motor.set_position_target(target.get()).hw()?;
        motor.run_to_absolute_position().hw()?;
    }
    tracing::info!(targets = ?targets, speed, "coordinated move started");

    let mv = CoordinatedMove { targets, done };
    s.schedule(move |p, s| mv.tick(p, s));
    Ok(())
}
