#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motion control for a three-motor plotter (hardware-agnostic).
//!
//! All hardware interactions go through `plotter_traits::Motor` and all
//! display output through `plotter_traits::UiSink`.
//!
//! ## Architecture
//!
//! - **Scheduling**: cooperative priority/time task queue (`scheduler` module)
//! - **Units**: raw encoder ticks vs. normalized `0..=travel` positions (`units`)
//! - **Context**: motors, display, calibration and G-code modes (`plotter`)
//! - **Homing**: stall-detection calibration state machine (`homing`)
//! - **Moves**: coordinated absolute moves (`go`)
//! - **Commands**: G-code command dispatch (`commands`)
//!
//! Long-running operations never block: each one is a state machine that
//! polls on its own scheduled ticks and hands itself to the next tick.

pub mod commands;
pub mod config;
pub mod conversions;
pub mod error;
pub mod go;
pub mod homing;
pub mod hw_error;
pub mod mocks;
pub mod plotter;
pub mod scheduler;
pub mod units;

pub use commands::{Command, GCodeState, dispatch};
pub use config::{MotionCfg, UnitsCfg};
pub use error::{Outcome, PlotterError, Result};
pub use go::{MoveTargets, go};
pub use homing::{HomingState, home};
pub use plotter::{AxisUnit, Plotter};
pub use scheduler::{Priority, Scheduler};
pub use units::{Axis, CalibrationBounds, Limit, NormalizedPosition, RawPosition};
