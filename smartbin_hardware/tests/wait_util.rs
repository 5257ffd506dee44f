use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::thread;
use std::time::Duration;

use smartbin_hardware::error::HwError;
use smartbin_hardware::util::{measure_high_pulse_with_timeout, wait_until_low_with_timeout};

#[test]
fn wait_until_low_success_path() {
    let high = Arc::new(AtomicBool::new(true));
    let high_bg = high.clone();
    // Flip low after a short delay
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(50),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn wait_until_low_timeout_path() {
    let high = Arc::new(AtomicBool::new(true));

    let err = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(5),
        Duration::from_micros(200),
    )
    .expect_err("expected timeout error");

    match err {
        HwError::DataReadyTimeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn pulse_measurement_sees_rise_and_fall() {
    // Line reads low twice, high three times, then low again.
    let polls = AtomicUsize::new(0);
    let pulse = measure_high_pulse_with_timeout(
        || {
            let n = polls.fetch_add(1, Ordering::Relaxed);
            (2..5).contains(&n)
        },
        Duration::from_millis(20),
    )
    .expect("pulse measured");
    assert!(pulse < Duration::from_millis(20));
    assert_eq!(polls.load(Ordering::Relaxed), 6);
}

#[test]
fn missing_echo_times_out() {
    let err = measure_high_pulse_with_timeout(|| false, Duration::from_millis(2))
        .expect_err("no rising edge");
    assert!(matches!(err, HwError::EchoTimeout));
}

#[test]
fn stuck_high_echo_times_out() {
    let err = measure_high_pulse_with_timeout(|| true, Duration::from_millis(2))
        .expect_err("no falling edge");
    assert!(matches!(err, HwError::EchoTimeout));
}
