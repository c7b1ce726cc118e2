#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the plotter.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; a missing section takes its defaults, so an
//!   empty file is a valid config.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MotionCfg {
    /// Speed set-point for coordinated moves (ticks/s)
    pub go_speed: i32,
    /// Poll interval while waiting for a coordinated move to land
    pub go_poll_ms: u64,
    /// Poll interval while waiting for a homing leg to stall
    pub homing_poll_ms: u64,
    /// Delay between starting a homing leg and the first stall check
    pub spin_up_ms: u64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            go_speed: 200,
            go_poll_ms: 200,
            homing_poll_ms: 10,
            spin_up_ms: 300,
        }
    }
}

/// Length of one normalized step in each unit system. Index 0 = X, 1 = Y, 2 = tool.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UnitsCfg {
    pub mm_per_step: [f64; 3],
    pub inches_per_step: [f64; 3],
}

impl Default for UnitsCfg {
    fn default() -> Self {
        Self {
            mm_per_step: [0.1, 0.1, 0.1],
            inches_per_step: [0.00397, 0.00397, 0.00397],
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SimAxis {
    Tool,
    X,
    Y,
}

/// Physical travel of one simulated axis in ticks.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SimTravel {
    pub lower: i32,
    pub upper: i32,
    #[serde(default)]
    pub start: i32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimCfg {
    /// Free-running speed (ticks/s) per duty-cycle percent
    pub ticks_per_duty: f64,
    /// Axes whose motor is simulated as unplugged
    pub disconnected: Vec<SimAxis>,
    pub tool: SimTravel,
    pub x: SimTravel,
    pub y: SimTravel,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            ticks_per_duty: 10.0,
            disconnected: Vec::new(),
            tool: SimTravel {
                lower: -40,
                upper: 60,
                start: 0,
            },
            x: SimTravel {
                lower: -600,
                upper: 600,
                start: 0,
            },
            y: SimTravel {
                lower: -1500,
                upper: 1500,
                start: 0,
            },
        }
    }
}

impl SimCfg {
    pub fn is_connected(&self, axis: SimAxis) -> bool {
        !self.disconnected.contains(&axis)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiCfg {
    /// Confirm result screens ("Exit" button) automatically
    pub auto_dismiss: bool,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self { auto_dismiss: true }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub motion: MotionCfg,
    pub units: UnitsCfg,
    pub sim: SimCfg,
    pub ui: UiCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn check_per_step(name: &str, table: &[f64; 3]) -> eyre::Result<()> {
    for (i, v) in table.iter().enumerate() {
        if !(v.is_finite() && *v > 0.0) {
            eyre::bail!("units.{name}[{i}] must be > 0");
        }
    }
    Ok(())
}

fn check_travel(name: &str, t: &SimTravel) -> eyre::Result<()> {
    if t.lower >= t.upper {
        eyre::bail!("sim.{name}.lower must be < sim.{name}.upper");
    }
    if t.start < t.lower || t.start > t.upper {
        eyre::bail!("sim.{name}.start must be within [lower, upper]");
    }
    Ok(())
}

impl Config {
    /// Validate config values for basic sanity.
    pub fn validate(&self) -> eyre::Result<()> {
        // Motion
        if self.motion.go_speed <= 0 {
            eyre::bail!("motion.go_speed must be > 0");
        }
        if self.motion.go_poll_ms == 0 {
            eyre::bail!("motion.go_poll_ms must be >= 1");
        }
        if self.motion.homing_poll_ms == 0 {
            eyre::bail!("motion.homing_poll_ms must be >= 1");
        }
        if self.motion.spin_up_ms > 60 * 1000 {
            eyre::bail!("motion.spin_up_ms is unreasonably large (>1min)");
        }

        // Units
        check_per_step("mm_per_step", &self.units.mm_per_step)?;
        check_per_step("inches_per_step", &self.units.inches_per_step)?;

        // Simulation
        if !(self.sim.ticks_per_duty.is_finite() && self.sim.ticks_per_duty > 0.0) {
            eyre::bail!("sim.ticks_per_duty must be > 0");
        }
        check_travel("tool", &self.sim.tool)?;
        check_travel("x", &self.sim.x)?;
        check_travel("y", &self.sim.y)?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of: never, daily, hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn disconnected_axes_parse_lowercase() {
        let cfg = load_toml("[sim]\ndisconnected = [\"tool\", \"y\"]\n").unwrap();
        assert!(!cfg.sim.is_connected(SimAxis::Tool));
        assert!(cfg.sim.is_connected(SimAxis::X));
        assert!(!cfg.sim.is_connected(SimAxis::Y));
    }

    #[test]
    fn unknown_axis_is_a_parse_error() {
        assert!(load_toml("[sim]\ndisconnected = [\"z\"]\n").is_err());
    }
}
