#![no_main]
use libfuzzer_sys::fuzz_target;
use plotter_core::units::{clamp_between, to_norm, to_raw, travel};
use plotter_core::{NormalizedPosition, RawPosition};

fuzz_target!(|input: (i32, i32, i32)| {
    let (a, b, v) = input;
    let (min, max) = (RawPosition::new(a), RawPosition::new(b));

    let raw = to_raw(min, max, NormalizedPosition::new(v));
    assert_eq!(clamp_between(raw, min, max), raw);

    let norm = to_norm(min, max, RawPosition::new(v));
    assert!(norm.get() >= 0 && norm <= travel(min, max));
});
