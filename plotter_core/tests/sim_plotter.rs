//! Home and move a fully simulated plotter; motor time follows the scheduler clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use plotter_core::mocks::RecordingUi;
use plotter_core::{
    Axis, Command, NormalizedPosition, Outcome, Plotter, RawPosition, Scheduler, dispatch,
};
use plotter_hardware::{SimulatedMotor, Travel};
use plotter_traits::clock::test_clock::TestClock;
use plotter_traits::{Clock, Widget};

type SimPlotter = Plotter<SimulatedMotor, RecordingUi>;

fn sim_plotter(clock: &TestClock) -> SimPlotter {
    let c: Arc<dyn Clock + Send + Sync> = Arc::new(clock.clone());
    Plotter::new(
        SimulatedMotor::new("tool", Travel::new(-40, 60, 0), 10.0, c.clone()),
        SimulatedMotor::new("x", Travel::new(-600, 600, 0), 10.0, c.clone()),
        SimulatedMotor::new("y", Travel::new(-1500, 1500, 0), 10.0, c),
        RecordingUi::default(),
    )
}

/// Confirms the results screen as soon as it shows up.
fn dismiss_results(p: &mut SimPlotter) {
    let showing_results = p
        .ui()
        .current()
        .and_then(Widget::as_message)
        .is_some_and(|m| m.header == "Homing results:");
    if showing_results {
        p.ui_mut().press_confirm();
    }
}

fn send(
    p: &mut SimPlotter,
    s: &mut Scheduler<SimPlotter>,
    command: Command,
) -> Rc<RefCell<Vec<Outcome<()>>>> {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let out = replies.clone();
    dispatch(p, s, command, Widget::screen("main menu"), move |_, _, r| {
        out.borrow_mut().push(r);
        Ok(())
    })
    .unwrap();
    replies
}

#[test]
fn homes_against_simulated_limits_then_moves() {
    let clock = TestClock::new();
    let mut s = Scheduler::with_clock(Arc::new(clock.clone())).with_after_step(dismiss_results);
    let mut p = sim_plotter(&clock);

    let replies = send(&mut p, &mut s, Command::Home);
    s.run(&mut p).unwrap();
    assert_eq!(*replies.borrow(), vec![Ok(())]);

    let b = *p.homed().expect("homed");
    assert_eq!(b.tool_up, RawPosition::new(-20));
    assert_eq!(b.x_min, RawPosition::new(570));
    assert_eq!(b.x_max, RawPosition::new(-570));
    assert_eq!(b.y_min, RawPosition::new(-1150));
    assert_eq!(b.y_max, RawPosition::new(1470));
    assert_eq!(b.tool_down, RawPosition::new(45));

    let replies = send(
        &mut p,
        &mut s,
        Command::Go {
            x: Some(10.0),
            y: Some(5.0),
            z: None,
        },
    );
    s.run(&mut p).unwrap();
    assert_eq!(*replies.borrow(), vec![Ok(())]);
    assert_eq!(p.read_axis(Axis::X).unwrap(), NormalizedPosition::new(100));
    assert_eq!(p.read_axis(Axis::Y).unwrap(), NormalizedPosition::new(50));
    assert_eq!(p.status_line().unwrap(), "[0|100,50]");
}
