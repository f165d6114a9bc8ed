use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use smartbin_hardware::error::HwError;
use smartbin_hardware::util::measure_high_pulse;

#[test]
fn measures_pulse_driven_from_another_thread() {
    let high = Arc::new(AtomicBool::new(false));
    let high_bg = high.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(2));
        high_bg.store(true, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(5));
        high_bg.store(false, Ordering::Relaxed);
    });

    let width = measure_high_pulse(|| high.load(Ordering::Relaxed), Duration::from_millis(500))
        .expect("pulse should complete");
    assert!(width >= Duration::from_millis(4), "pulse too short: {width:?}");
}

#[test]
fn missing_echo_times_out() {
    let err = measure_high_pulse(|| false, Duration::from_millis(5)).expect_err("expected timeout");
    match err {
        HwError::EchoTimeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn stuck_high_line_times_out() {
    let err = measure_high_pulse(|| true, Duration::from_millis(5)).expect_err("expected timeout");
    assert!(matches!(err, HwError::EchoTimeout));
}
