//! Homing: drive every axis into its mechanical limits and record where each
//! one stalls.
//!
//! The sequence is a pure state machine (`HomingState::transition`) that
//! turns one poll's observation into the next state plus a list of
//! `Effect`s. The executor in this module reads the motors, feeds the
//! machine, applies the effects and re-schedules itself; it owns the machine
//! by value and moves it into each continuation.

use plotter_traits::{Button, Message, Motor, Polarity, UiSink, Widget};

use crate::error::{Outcome, PlotterError, Result, join_axes};
use crate::hw_error::HwResultExt;
use crate::plotter::Plotter;
use crate::scheduler::Scheduler;
use crate::units::{Axis, CalibrationBounds, Limit, RawPosition};

/// One homing leg: run `axis` open-loop until it stalls, then record the
/// stalled position shifted by `compensation` as `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub step: u8,
    pub axis: Axis,
    pub duty_cycle: i32,
    pub compensation: i32,
    pub limit: Limit,
    pub label: &'static str,
}

impl Leg {
    pub fn progress_text(&self) -> String {
        format!(
            "Step {} of {}: {}\nPress 'ok' to stop.",
            self.step,
            LEGS.len(),
            self.label
        )
    }

    /// Stalled position with this leg's compensation applied.
    pub fn compensate(&self, stalled_at: RawPosition) -> RawPosition {
        stalled_at + RawPosition::new(self.compensation)
    }
}

pub const TOOL_UP: Leg = Leg {
    step: 1,
    axis: Axis::Tool,
    duty_cycle: -30,
    compensation: 20,
    limit: Limit::ToolUp,
    label: "tool up",
};

pub const X_LEFT: Leg = Leg {
    step: 2,
    axis: Axis::X,
    duty_cycle: 50,
    compensation: -30,
    limit: Limit::XMin,
    label: "x min (left)",
};

pub const X_RIGHT: Leg = Leg {
    step: 3,
    axis: Axis::X,
    duty_cycle: -50,
    compensation: 30,
    limit: Limit::XMax,
    label: "x max (right)",
};

pub const Y_MIN: Leg = Leg {
    step: 4,
    axis: Axis::Y,
    duty_cycle: -40,
    compensation: 350,
    limit: Limit::YMin,
    label: "y min",
};

pub const Y_MAX: Leg = Leg {
    step: 5,
    axis: Axis::Y,
    duty_cycle: 40,
    compensation: -30,
    limit: Limit::YMax,
    label: "y max",
};

pub const TOOL_DOWN: Leg = Leg {
    step: 6,
    axis: Axis::Tool,
    duty_cycle: 20,
    compensation: -15,
    limit: Limit::ToolDown,
    label: "tool down",
};

pub const LEGS: [Leg; 6] = [TOOL_UP, X_LEFT, X_RIGHT, Y_MIN, Y_MAX, TOOL_DOWN];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomingState {
    Start,
    HomingToolUp,
    HomingXLeft,
    HomingXRight,
    HomingYMin,
    HomingYMax,
    GoForHomingToolDown,
    HomingToolDown,
    ShowResults,
    /// Waiting for the user to dismiss the final screen; carries the error
    /// when homing could not run at all.
    ShowingResults(Option<PlotterError>),
    Stop,
    StopFailed,
}

/// What the executor saw on one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    /// The confirm/ok button was pressed since the last poll.
    pub confirm: bool,
    /// Raw position of the active leg's motor, if it reports a stall.
    pub stalled_at: Option<RawPosition>,
}

impl Observation {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn confirm() -> Self {
        Self {
            confirm: true,
            stalled_at: None,
        }
    }

    pub fn stalled(at: i32) -> Self {
        Self {
            confirm: false,
            stalled_at: Some(RawPosition::new(at)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reset all three motors.
    ResetMotors,
    /// Normal polarity, leg duty cycle, run-direct; show the leg's progress.
    StartLeg(Leg),
    StopMotor(Axis),
    Record(Limit, RawPosition),
    /// Replace the screen with the bounds report.
    ShowResults,
    /// Put back the screen that was shown before homing.
    RestorePrevious,
    Complete,
    Fail(PlotterError),
}

impl HomingState {
    /// Leg whose motor is being watched for a stall in this state.
    pub fn active_leg(&self) -> Option<Leg> {
        match self {
            HomingState::HomingToolUp => Some(TOOL_UP),
            HomingState::HomingXLeft => Some(X_LEFT),
            HomingState::HomingXRight => Some(X_RIGHT),
            HomingState::HomingYMin => Some(Y_MIN),
            HomingState::HomingYMax => Some(Y_MAX),
            HomingState::HomingToolDown => Some(TOOL_DOWN),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, HomingState::Stop | HomingState::StopFailed)
    }

    /// Advance by one poll.
    pub fn transition(self, obs: Observation) -> (HomingState, Vec<Effect>) {
        use HomingState as S;

        match self {
            S::Stop | S::StopFailed => (self, Vec::new()),
            S::ShowingResults(None) if obs.confirm => {
                (S::Stop, vec![Effect::RestorePrevious, Effect::Complete])
            }
            S::ShowingResults(Some(e)) if obs.confirm => {
                (S::StopFailed, vec![Effect::RestorePrevious, Effect::Fail(e)])
            }
            S::ShowingResults(_) => (self, Vec::new()),
            _ if obs.confirm => (
                S::StopFailed,
                vec![
                    Effect::RestorePrevious,
                    Effect::Fail(PlotterError::HomingCancelled),
                ],
            ),
            S::Start => (
                S::HomingToolUp,
                vec![Effect::ResetMotors, Effect::StartLeg(TOOL_UP)],
            ),
            S::GoForHomingToolDown => (S::HomingToolDown, vec![Effect::StartLeg(TOOL_DOWN)]),
            S::ShowResults => (S::ShowingResults(None), vec![Effect::ShowResults]),
            leg_state => {
                let (Some(leg), Some(at)) = (leg_state.active_leg(), obs.stalled_at) else {
                    return (leg_state, Vec::new());
                };
                let mut effects = vec![
                    Effect::Record(leg.limit, leg.compensate(at)),
                    Effect::StopMotor(leg.axis),
                ];
                let next = match leg_state {
                    S::HomingToolUp => {
                        effects.push(Effect::StartLeg(X_LEFT));
                        S::HomingXLeft
                    }
                    S::HomingXLeft => {
                        effects.push(Effect::StartLeg(X_RIGHT));
                        S::HomingXRight
                    }
                    S::HomingXRight => {
                        effects.push(Effect::StartLeg(Y_MIN));
                        S::HomingYMin
                    }
                    S::HomingYMin => {
                        effects.push(Effect::StartLeg(Y_MAX));
                        S::HomingYMax
                    }
                    S::HomingYMax => S::GoForHomingToolDown,
                    _ => S::ShowResults,
                };
                (next, effects)
            }
        }
    }
}

/// Running homing pass, owned by whichever task is scheduled next.
struct Homing<F> {
    state: HomingState,
    bounds: CalibrationBounds,
    previous: Widget,
    done: F,
}

impl<F> Homing<F> {
    fn observe<M: Motor, U: UiSink>(&self, p: &mut Plotter<M, U>) -> Result<Observation> {
        let confirm = p.ui_mut().take_confirm();
        let stalled_at = match self.state.active_leg() {
            Some(leg) if !confirm => {
                let motor = p.motor(leg.axis);
                if motor.state().hw()?.is_stalled() {
                    Some(RawPosition::new(motor.position().hw()?))
                } else {
                    None
                }
            }
            _ => None,
        };
        Ok(Observation {
            confirm,
            stalled_at,
        })
    }

    fn tick<M, U>(mut self, p: &mut Plotter<M, U>, s: &mut Scheduler<Plotter<M, U>>) -> Result<()>
    where
        M: Motor,
        U: UiSink,
        F: FnOnce(&mut Plotter<M, U>, &mut Scheduler<Plotter<M, U>>, Outcome<CalibrationBounds>) -> Result<()>
            + 'static,
    {
        let obs = self.observe(p)?;
        let current = std::mem::replace(&mut self.state, HomingState::StopFailed);
        let (next, effects) = current.transition(obs);

        let mut delay = p.motion().homing_poll;
        let mut outcome = None;
        for effect in effects {
            match effect {
                Effect::ResetMotors => {
                    for axis in Axis::ALL {
                        p.motor_mut(axis).reset().hw()?;
                    }
                }
                Effect::StartLeg(leg) => {
                    let motor = p.motor_mut(leg.axis);
                    motor.set_polarity(Polarity::Normal).hw()?;
                    motor.set_duty_cycle(leg.duty_cycle).hw()?;
                    motor.run_direct().hw()?;
                    p.ui_mut().update_text(leg.progress_text());
                    tracing::debug!(step = leg.step, axis = %leg.axis, duty = leg.duty_cycle, "homing leg started");
                    delay = p.motion().spin_up;
                }
                Effect::StopMotor(axis) => p.motor_mut(axis).stop().hw()?,
                Effect::Record(limit, pos) => {
                    self.bounds.set(limit, pos);
                    tracing::info!(limit = ?limit, raw = pos.get(), "limit recorded");
                }
                Effect::ShowResults => {
                    let report = self.bounds.report();
                    p.ui_mut()
                        .set_widget(Message::new("Homing results:", report, Button::Exit).into());
                }
                Effect::RestorePrevious => p.ui_mut().set_widget(self.previous.clone()),
                Effect::Complete => outcome = Some(Ok(self.bounds)),
                Effect::Fail(e) => outcome = Some(Err(e)),
            }
        }
        self.state = next;

        match outcome {
            Some(result) => {
                match &result {
                    Ok(bounds) => tracing::info!(%bounds, "homing finished"),
                    Err(e) => tracing::warn!(error = %e, "homing failed"),
                }
                (self.done)(p, s, result)
            }
            None if self.state.is_terminal() => Ok(()),
            None => {
                s.schedule_after(delay, move |p, s| self.tick(p, s));
                Ok(())
            }
        }
    }
}

/// Start a homing pass.
///
/// Shows a progress message, then runs each leg in turn on the scheduler.
/// `done` is called exactly once: with the recorded bounds after the user
/// dismisses the results screen, or with the error when a motor is missing
/// or the user cancels. `previous` is put back on screen in both cases.
pub fn home<M, U, F>(p: &mut Plotter<M, U>, s: &mut Scheduler<Plotter<M, U>>, previous: Widget, done: F)
where
    M: Motor,
    U: UiSink,
    F: FnOnce(&mut Plotter<M, U>, &mut Scheduler<Plotter<M, U>>, Outcome<CalibrationBounds>) -> Result<()>
        + 'static,
{
    let missing = p.disconnected_axes();
    let state = if missing.is_empty() {
        p.ui_mut().set_widget(
            Message::new("Homing, please wait...", TOOL_UP.progress_text(), Button::Stop).into(),
        );
        tracing::info!("homing started");
        HomingState::Start
    } else {
        tracing::warn!(axes = %join_axes(&missing), "cannot home, motor not connected");
        p.ui_mut().set_widget(
            Message::new(
                "Homing failed :(",
                format!("{} motor\nnot connected!", join_axes(&missing)),
                Button::Stop,
            )
            .into(),
        );
        HomingState::ShowingResults(Some(PlotterError::NotConnected(missing)))
    };

    let homing = Homing {
        state,
        bounds: CalibrationBounds::default(),
        previous,
        done,
    };
    s.schedule(move |p, s| homing.tick(p, s));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_resets_and_runs_tool_up() {
        let (next, effects) = HomingState::Start.transition(Observation::idle());
        assert_eq!(next, HomingState::HomingToolUp);
        assert_eq!(effects, vec![Effect::ResetMotors, Effect::StartLeg(TOOL_UP)]);
    }

    #[test]
    fn waiting_leg_without_stall_does_nothing() {
        let (next, effects) = HomingState::HomingYMin.transition(Observation::idle());
        assert_eq!(next, HomingState::HomingYMin);
        assert!(effects.is_empty());
    }

    #[test]
    fn stall_records_compensated_limit_and_starts_next_leg() {
        let (next, effects) = HomingState::HomingYMin.transition(Observation::stalled(-1000));
        assert_eq!(next, HomingState::HomingYMax);
        assert_eq!(
            effects,
            vec![
                Effect::Record(Limit::YMin, RawPosition::new(-650)),
                Effect::StopMotor(Axis::Y),
                Effect::StartLeg(Y_MAX),
            ]
        );
    }

    #[test]
    fn y_max_goes_through_tool_down_preparation() {
        let (next, effects) = HomingState::HomingYMax.transition(Observation::stalled(1000));
        assert_eq!(next, HomingState::GoForHomingToolDown);
        assert_eq!(effects.len(), 2);

        let (next, effects) = next.transition(Observation::idle());
        assert_eq!(next, HomingState::HomingToolDown);
        assert_eq!(effects, vec![Effect::StartLeg(TOOL_DOWN)]);
    }

    #[test]
    fn confirm_before_results_cancels_without_stopping_motors() {
        for state in [
            HomingState::Start,
            HomingState::HomingXRight,
            HomingState::GoForHomingToolDown,
            HomingState::ShowResults,
        ] {
            let (next, effects) = state.transition(Observation::confirm());
            assert_eq!(next, HomingState::StopFailed);
            assert_eq!(
                effects,
                vec![
                    Effect::RestorePrevious,
                    Effect::Fail(PlotterError::HomingCancelled)
                ]
            );
        }
    }

    #[test]
    fn results_wait_for_confirm() {
        let (next, effects) = HomingState::ShowingResults(None).transition(Observation::idle());
        assert_eq!(next, HomingState::ShowingResults(None));
        assert!(effects.is_empty());

        let (next, effects) = next.transition(Observation::confirm());
        assert_eq!(next, HomingState::Stop);
        assert_eq!(effects, vec![Effect::RestorePrevious, Effect::Complete]);
    }

    #[test]
    fn failed_entry_reports_its_error_on_confirm() {
        let err = PlotterError::NotConnected(vec![Axis::Tool]);
        let (next, effects) =
            HomingState::ShowingResults(Some(err.clone())).transition(Observation::confirm());
        assert_eq!(next, HomingState::StopFailed);
        assert_eq!(effects, vec![Effect::RestorePrevious, Effect::Fail(err)]);
    }

    #[test]
    fn terminal_states_are_inert() {
        for state in [HomingState::Stop, HomingState::StopFailed] {
            let (next, effects) = state.clone().transition(Observation::confirm());
            assert_eq!(next, state);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn legs_are_numbered_in_order() {
        for (i, leg) in LEGS.iter().enumerate() {
            assert_eq!(usize::from(leg.step), i + 1);
        }
        assert_eq!(
            X_RIGHT.progress_text(),
            "Step 3 of 6: x max (right)\nPress 'ok' to stop."
        );
    }
}
