//! Human-readable error descriptions and structured JSON error formatting.

use plotter_core::PlotterError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(pe) = err.downcast_ref::<PlotterError>() {
        return match pe {
            PlotterError::NotConnected(_) => format!(
                "What happened: {pe}.\nLikely causes: Motor cable unplugged, or listed under sim.disconnected in the config.\nHow to fix: Plug the motor in (or remove it from sim.disconnected) and run `plotter self-check`."
            ),
            PlotterError::HomingCancelled => {
                "What happened: Homing was cancelled.\nLikely causes: The ok button (Ctrl-C) was pressed while homing.\nHow to fix: Run `plotter home` again and let it finish.".to_string()
            }
            PlotterError::NotHomed => {
                "What happened: The plotter is not homed.\nLikely causes: A move was requested before homing finished.\nHow to fix: Run homing first; `plotter go` does this automatically.".to_string()
            }
            PlotterError::HardwareFault(msg) => format!(
                "What happened: A motor reported a fault ({msg}).\nLikely causes: Overload or a jammed carriage.\nHow to fix: Check the mechanics, then home again."
            ),
            PlotterError::MoveCancelled => {
                "What happened: The move was cancelled before reaching its target.\nLikely causes: The ok button (Ctrl-C) was pressed during the move.\nHow to fix: Run the move again; the motors hold wherever they stopped.".to_string()
            }
            PlotterError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values or a typo in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/plotter.toml for a sample."
            ),
            PlotterError::Hardware(_) => format!(
                "What happened: {pe}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for the JSON `reason` field.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<PlotterError>() {
        Some(PlotterError::NotConnected(_)) => "NotConnected",
        Some(PlotterError::HomingCancelled) => "HomingCancelled",
        Some(PlotterError::NotHomed) => "NotHomed",
        Some(PlotterError::Hardware(_)) => "Hardware",
        Some(PlotterError::HardwareFault(_)) => "HardwareFault",
        Some(PlotterError::MoveCancelled) => "MoveCancelled",
        Some(PlotterError::Config(_)) => "Config",
        None => "Error",
    }
}

/// Exit codes: 3 not connected, 4 cancelled, 5 not homed, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "NotConnected" => 3,
        "HomingCancelled" | "MoveCancelled" => 4,
        "NotHomed" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let msg = humanize(err);
    match err.downcast_ref::<PlotterError>() {
        Some(PlotterError::NotConnected(axes)) => {
            let axes: Vec<&str> = axes.iter().map(|a| a.label()).collect();
            json!({ "reason": reason, "details": { "axes": axes }, "message": msg })
        }
        _ => json!({ "reason": reason, "message": msg }),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotter_core::Axis;
    use rstest::rstest;

    #[rstest]
    #[case(PlotterError::NotConnected(vec![Axis::Y]), 3)]
    #[case(PlotterError::HomingCancelled, 4)]
    #[case(PlotterError::NotHomed, 5)]
    #[case(PlotterError::Hardware("io".into()), 1)]
    fn typed_errors_have_stable_exit_codes(#[case] e: PlotterError, #[case] code: i32) {
        assert_eq!(exit_code_for_error(&eyre::Report::new(e)), code);
    }

    #[rstest]
    #[case(PlotterError::MoveCancelled, 4, "MoveCancelled")]
    #[case(PlotterError::Config("motion.go_speed must be > 0".into()), 1, "Config")]
    fn typed_errors_have_stable_reason_names(
        #[case] e: PlotterError,
        #[case] code: i32,
        #[case] reason: &str,
    ) {
        let err = eyre::Report::new(e);
        assert_eq!(exit_code_for_error(&err), code);
        assert_eq!(reason_name(&err), reason);
    }

    #[test]
    fn untyped_error_mentioning_cancel_stays_generic() {
        let err = eyre::eyre!("move cancelled before reaching its target");
        assert_eq!(exit_code_for_error(&err), 1);
        assert_eq!(reason_name(&err), "Error");
        assert!(humanize(&err).starts_with("Something went wrong."));
    }

    #[test]
    fn not_connected_json_lists_axes() {
        let err = eyre::Report::new(PlotterError::NotConnected(vec![Axis::Tool, Axis::X]));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "NotConnected");
        assert_eq!(v["details"]["axes"], serde_json::json!(["tool", "x"]));
        assert!(v["message"].as_str().unwrap().contains("tool, x motor not connected"));
    }

    #[test]
    fn invalid_config_mentions_the_field() {
        let err = eyre::Report::new(PlotterError::Config("motion.go_speed must be > 0".into()));
        assert!(humanize(&err).contains("motion.go_speed"));
    }
}
