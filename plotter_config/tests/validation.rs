use plotter_config::load_toml;
use rstest::rstest;
use std::io::Write;

#[test]
fn accepts_full_example_config() {
    let toml = r#"
[motion]
go_speed = 250
go_poll_ms = 100
homing_poll_ms = 5
spin_up_ms = 200

[units]
mm_per_step = [0.1, 0.1, 0.05]
inches_per_step = [0.00397, 0.00397, 0.002]

[sim]
ticks_per_duty = 20.0
disconnected = ["x"]
tool = { lower = -40, upper = 60, start = 0 }
x = { lower = -600, upper = 600, start = 10 }
y = { lower = -1500, upper = 1500 }

[ui]
auto_dismiss = false

[logging]
file = "plotter.log"
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.motion.go_speed, 250);
    assert_eq!(cfg.units.mm_per_step[2], 0.05);
    assert_eq!(cfg.sim.x.start, 10);
    assert_eq!(cfg.sim.y.start, 0);
    assert!(!cfg.ui.auto_dismiss);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn partial_section_keeps_other_defaults() {
    let cfg = load_toml("[motion]\ngo_speed = 120\n").expect("parse TOML");
    assert_eq!(cfg.motion.go_speed, 120);
    assert_eq!(cfg.motion.go_poll_ms, 200);
    assert_eq!(cfg.motion.homing_poll_ms, 10);
    assert_eq!(cfg.motion.spin_up_ms, 300);
}

#[rstest]
#[case("[motion]\ngo_speed = 0\n", "go_speed must be > 0")]
#[case("[motion]\ngo_poll_ms = 0\n", "go_poll_ms must be >= 1")]
#[case("[motion]\nhoming_poll_ms = 0\n", "homing_poll_ms must be >= 1")]
#[case("[motion]\nspin_up_ms = 120000\n", "spin_up_ms is unreasonably large")]
#[case("[units]\nmm_per_step = [0.1, 0.0, 0.1]\n", "mm_per_step[1] must be > 0")]
#[case(
    "[units]\ninches_per_step = [-1.0, 0.1, 0.1]\n",
    "inches_per_step[0] must be > 0"
)]
#[case("[sim]\nticks_per_duty = 0.0\n", "ticks_per_duty must be > 0")]
#[case(
    "[sim]\nx = { lower = 10, upper = 10 }\n",
    "sim.x.lower must be < sim.x.upper"
)]
#[case(
    "[sim]\ntool = { lower = -5, upper = 5, start = 9 }\n",
    "sim.tool.start must be within"
)]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(expected),
        "error {err} does not mention {expected}"
    );
}

#[test]
fn loads_from_file_on_disk() {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(f, "[ui]\nauto_dismiss = false").expect("write");
    let text = std::fs::read_to_string(f.path()).expect("read back");
    let cfg = load_toml(&text).expect("parse TOML");
    assert!(!cfg.ui.auto_dismiss);
    cfg.validate().expect("valid config");
}
