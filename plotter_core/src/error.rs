use thiserror::Error;

use crate::units::Axis;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlotterError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("{} motor not connected", join_axes(.0))]
    NotConnected(Vec<Axis>),
    #[error("homing cancelled")]
    HomingCancelled,
    #[error("not homed")]
    NotHomed,
    #[error("move cancelled before reaching its target")]
    MoveCancelled,
    #[error("configuration error: {0}")]
    Config(String),
}

pub(crate) fn join_axes(axes: &[Axis]) -> String {
    axes.iter()
        .map(|a| a.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = eyre::Result<T>;

/// What a completion callback receives: the value or the typed failure.
pub type Outcome<T> = std::result::Result<T, PlotterError>;
pub use eyre::Report;
