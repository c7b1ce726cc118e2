use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use plotter_core::mocks::{MockMotor, RecordingUi};
use plotter_core::{
    Axis, CalibrationBounds, Command, Outcome, Plotter, PlotterError, RawPosition, Scheduler,
    UnitsCfg, dispatch,
};
use plotter_traits::Widget;
use plotter_traits::clock::test_clock::TestClock;
use rstest::rstest;

type TestPlotter = Plotter<MockMotor, RecordingUi>;
type Replies = Rc<RefCell<Vec<Outcome<()>>>>;

fn bounds() -> CalibrationBounds {
    CalibrationBounds {
        x_min: RawPosition::new(30),
        x_max: RawPosition::new(-30),
        y_min: RawPosition::new(-650),
        y_max: RawPosition::new(970),
        tool_up: RawPosition::new(-10),
        tool_down: RawPosition::new(25),
    }
}

fn homed_plotter(units: UnitsCfg) -> TestPlotter {
    let mut p = Plotter::new(
        MockMotor::default(),
        MockMotor::default(),
        MockMotor::default(),
        RecordingUi::default(),
    )
    .with_units(units);
    p.set_homed(bounds());
    p
}

fn half_steps() -> UnitsCfg {
    UnitsCfg {
        mm_per_step: [0.5, 0.5, 0.5],
        inches_per_step: [0.25, 0.25, 0.25],
    }
}

fn send(p: &mut TestPlotter, s: &mut Scheduler<TestPlotter>, command: Command) -> Replies {
    let replies: Replies = Rc::default();
    let out = replies.clone();
    dispatch(p, s, command, Widget::screen("main menu"), move |_, _, r| {
        out.borrow_mut().push(r);
        Ok(())
    })
    .unwrap();
    replies
}

fn scheduler() -> Scheduler<TestPlotter> {
    Scheduler::with_clock(Arc::new(TestClock::new()))
}

#[rstest]
#[case(Command::UseInches, false, false)]
#[case(Command::UseMillimeters, true, false)]
#[case(Command::RelativePositioning, true, true)]
#[case(Command::AbsolutePositioning, true, false)]
fn mode_commands_reply_at_once(
    #[case] command: Command,
    #[case] use_mm: bool,
    #[case] relative: bool,
) {
    let mut p = homed_plotter(UnitsCfg::default());
    let mut s = scheduler();
    let replies = send(&mut p, &mut s, command);

    assert_eq!(*replies.borrow(), vec![Ok(())]);
    assert_eq!(p.gcode().use_mm, use_mm);
    assert_eq!(p.gcode().relative_moves, relative);
    assert!(s.is_idle());
}

#[test]
fn go_before_homing_is_refused() {
    let mut p = Plotter::new(
        MockMotor::default(),
        MockMotor::default(),
        MockMotor::default(),
        RecordingUi::default(),
    );
    let mut s = scheduler();
    let replies = send(
        &mut p,
        &mut s,
        Command::Go {
            x: Some(1.0),
            y: None,
            z: None,
        },
    );
    assert_eq!(*replies.borrow(), vec![Err(PlotterError::NotHomed)]);
    assert!(s.is_idle());
    assert_eq!(p.motor(Axis::X).commands(), "");
}

#[test]
fn absolute_go_in_millimeters_maps_through_each_axis_interval() {
    let mut p = homed_plotter(half_steps());
    let mut s = scheduler();
    let replies = send(
        &mut p,
        &mut s,
        Command::Go {
            x: Some(5.0), // 10 steps from x_min=30 counting down
            y: Some(50.0), // 100 steps from y_min=-650 counting up
            z: Some(2.0),  // 4 steps up from tool_down=25
        },
    );
    assert_eq!(p.motor(Axis::X).position_target, Some(20));
    assert_eq!(p.motor(Axis::Y).position_target, Some(-550));
    assert_eq!(p.motor(Axis::Tool).position_target, Some(21));
    assert!(replies.borrow().is_empty());

    p.motor_mut(Axis::X).set_position(20);
    p.motor_mut(Axis::Y).set_position(-550);
    p.motor_mut(Axis::Tool).set_position(21);
    s.run(&mut p).unwrap();
    assert_eq!(*replies.borrow(), vec![Ok(())]);
}

#[test]
fn inches_use_their_own_step_length() {
    let mut p = homed_plotter(half_steps());
    let mut s = scheduler();
    send(&mut p, &mut s, Command::UseInches);
    send(
        &mut p,
        &mut s,
        Command::Go {
            x: None,
            y: Some(2.0), // 8 steps
            z: None,
        },
    );
    assert_eq!(p.motor(Axis::Y).position_target, Some(-642));
}

#[test]
fn coordinates_beyond_travel_are_clamped() {
    let mut p = homed_plotter(half_steps());
    let mut s = scheduler();
    send(
        &mut p,
        &mut s,
        Command::Go {
            x: Some(1000.0),
            y: Some(-3.0),
            z: None,
        },
    );
    assert_eq!(p.motor(Axis::X).position_target, Some(-30));
    assert_eq!(p.motor(Axis::Y).position_target, Some(-650));
}

#[test]
fn relative_go_adds_to_live_position() {
    let mut p = homed_plotter(half_steps());
    let mut s = scheduler();
    send(&mut p, &mut s, Command::RelativePositioning);

    p.motor_mut(Axis::X).set_position(0); // normalized 30
    p.motor_mut(Axis::Tool).set_position(25); // normalized 0
    send(
        &mut p,
        &mut s,
        Command::Go {
            x: Some(5.0), // +10 steps
            y: None,
            z: Some(-4.0), // -8 steps, clamped at 0
        },
    );
    assert_eq!(p.motor(Axis::X).position_target, Some(-10));
    assert_eq!(p.motor(Axis::Tool).position_target, Some(25));
}

#[test]
fn failed_home_keeps_previous_calibration() {
    let mut p = Plotter::new(
        MockMotor::disconnected(),
        MockMotor::default(),
        MockMotor::default(),
        RecordingUi::default(),
    );
    p.set_homed(bounds());
    let mut s = scheduler();
    let replies = send(&mut p, &mut s, Command::Home);
    p.ui_mut().press_confirm();
    s.run(&mut p).unwrap();

    assert_eq!(
        *replies.borrow(),
        vec![Err(PlotterError::NotConnected(vec![Axis::Tool]))]
    );
    assert_eq!(p.homed(), Some(&bounds()));
    assert_eq!(p.ui().current(), Some(&Widget::screen("main menu")));
}
