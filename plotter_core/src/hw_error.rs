//! Maps `Box<dyn Error>` from trait boundaries to typed `PlotterError`.
//!
//! The traits in `plotter_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `plotter_hardware::HwError` downcasting.

use plotter_traits::HwResult;

use crate::error::{PlotterError, Result};
#[cfg(feature = "hardware-errors")]
use crate::units::Axis;

/// Map a trait-boundary error to a typed `PlotterError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> PlotterError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<plotter_hardware::error::HwError>() {
            return match hw {
                plotter_hardware::error::HwError::Disconnected(name) => match Axis::from_label(name) {
                    Some(axis) => PlotterError::NotConnected(vec![axis]),
                    None => PlotterError::HardwareFault(hw.to_string()),
                },
                other => PlotterError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("fault") {
        PlotterError::HardwareFault(s)
    } else {
        PlotterError::Hardware(s)
    }
}

/// Lift a device-layer result into the core `Result`, typing the error.
pub trait HwResultExt<T> {
    fn hw(self) -> Result<T>;
}

impl<T> HwResultExt<T> for HwResult<T> {
    fn hw(self) -> Result<T> {
        self.map_err(|e| {
            let mapped = map_hw_error(e.as_ref());
            tracing::debug!(source = %e, error = %mapped, "device call failed");
            eyre::Report::new(mapped)
        })
    }
}
