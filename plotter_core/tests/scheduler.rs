use std::sync::Arc;
use std::time::Duration;

use plotter_core::error::Result;
use plotter_core::{Priority, Scheduler};
use plotter_traits::clock::test_clock::TestClock;

type Log = String;

fn add(s: &'static str) -> impl FnOnce(&mut Log, &mut Scheduler<Log>) -> Result<()> {
    move |log, _| {
        log.push_str(s);
        Ok(())
    }
}

fn scheduler(clock: &TestClock) -> Scheduler<Log> {
    Scheduler::with_clock(Arc::new(clock.clone()))
}

#[test]
fn three_operations_run_in_submission_order() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule(|log: &mut Log, s| {
        log.push('a');
        s.schedule(add("c"));
        Ok(())
    });
    s.schedule(add("b"));

    assert_eq!(log, "");
    s.run(&mut log).unwrap();
    assert_eq!(log, "abc");

    log.clear();
    s.run(&mut log).unwrap();
    assert_eq!(log, "");
}

#[test]
fn no_operations_returns_immediately() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    s.run(&mut Log::new()).unwrap();
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn delayed_task_runs_after_immediate_one() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule_after(Duration::from_millis(500), add("a"));
    s.schedule(add("b"));

    s.run(&mut log).unwrap();
    assert_eq!(log, "ba");
    assert_eq!(clock.elapsed(), Duration::from_millis(500));
}

#[test]
fn smaller_priority_runs_first() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule_with_priority(Priority(3), add("d"));
    s.schedule(add("a"));
    s.schedule_with_priority(Priority(2), add("c"));
    s.schedule_with_priority(Priority(0), |log: &mut Log, s| {
        log.push('a');
        s.schedule_with_priority(Priority(0), add("b"));
        Ok(())
    });

    s.run(&mut log).unwrap();
    assert_eq!(log, "aabcd");
}

#[test]
fn time_and_priority_mix_with_nested_submissions() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule_with_priority(Priority(3), add("d"));
    s.schedule_with_priority(Priority(2), |log: &mut Log, s| {
        log.push('c');
        s.schedule_with(Priority(0), Duration::from_millis(500), add("e"));
        Ok(())
    });
    s.schedule_with_priority(Priority(0), |log: &mut Log, s| {
        log.push('a');
        s.schedule_with_priority(Priority(0), add("b"));
        s.schedule_with(Priority(0), Duration::from_millis(1000), add("f"));
        Ok(())
    });
    s.schedule_with_priority(Priority(0), |_: &mut Log, s| {
        s.schedule_with(Priority(0), Duration::from_millis(1500), add("g"));
        Ok(())
    });

    s.run(&mut log).unwrap();
    assert_eq!(log, "abcdefg");
    assert_eq!(clock.elapsed(), Duration::from_millis(1500));
}

#[test]
fn due_time_beats_priority() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule_with(Priority(-5), Duration::from_millis(20), add("late"));
    s.schedule_with_priority(Priority(100), add("now,"));

    s.run(&mut log).unwrap();
    assert_eq!(log, "now,late");
}

fn count_to_ten(log: &mut Log, s: &mut Scheduler<Log>) -> Result<()> {
    if log.len() != 10 {
        log.push_str(&log.len().to_string());
        s.schedule_with_priority(Priority(10), count_to_ten);
    }
    Ok(())
}

#[test]
fn self_scheduling_loop_runs_until_it_stops_resubmitting() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    s.schedule(count_to_ten);
    s.run(&mut log).unwrap();

    assert_eq!(log, "0123456789");
    assert!(s.is_idle());
}

#[test]
fn periodic_loop_sleeps_between_iterations() {
    let clock = TestClock::new();
    let mut s = scheduler(&clock);
    let mut log = Log::new();

    fn tick(log: &mut Log, s: &mut Scheduler<Log>) -> Result<()> {
        log.push('.');
        if log.len() < 5 {
            s.schedule_with(Priority(10), Duration::from_millis(100), tick);
        }
        Ok(())
    }

    s.schedule(tick);
    s.run(&mut log).unwrap();
    assert_eq!(log, ".....");
    assert_eq!(clock.elapsed(), Duration::from_millis(400));
}
