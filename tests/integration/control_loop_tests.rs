//! Evaluate → Gate → Drive end to end, against mock clock and outputs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::mock_hw::{FixedClock, MockOutput, loaded_context};
use roomctl::control::outputs::{AC_G, AC_Y, CO2, DH, LIGHT};
use roomctl::router::MessageRouter;
use roomctl::scheduler::{self, Driver, Evaluator, Gate, Phase, Timing};
use roomctl::sensors::SensorId;

const AUTO: i32 = 2;
const MANUAL: i32 = 1;

fn bit(index: usize) -> u8 {
    1 << index
}

#[test]
fn cooling_follows_temperature_with_hysteresis() {
    // sp 24.0 °C, db 1.0 → on at 24.5, off below 23.5
    let (ctx, _nvs) = loaded_context(&[("ac_y_mode", AUTO), ("d_temp_sp", 240), ("cool_db", 10)]);
    let gate = Gate::new();
    let mut eval = Evaluator::new(ctx.clone(), FixedClock::unsynced());
    let mut drive = Driver::new(MockOutput::new());

    let mut step = |temp: i32| {
        ctx.sensors.set(SensorId::Temperature, temp);
        eval.tick(&gate);
        drive.drive_pending(&gate).unwrap().unwrap();
        gate.last_driven().unwrap() & bit(AC_Y) != 0
    };

    assert!(!step(240));
    assert!(step(245));
    assert!(step(236));
    assert!(!step(234));
}

#[test]
fn light_window_drives_every_scheduled_output() {
    let (ctx, _nvs) = loaded_context(&[
        ("ac_g_mode", AUTO),
        ("light_mode", AUTO),
        ("l_on_time_ts", 6 * 3600),
        ("l_off_time_ts", 18 * 3600),
    ]);
    let clock = FixedClock::at(12 * 3600);
    let gate = Gate::new();
    let mut eval = Evaluator::new(ctx, clock.clone());

    let day = eval.tick(&gate).bitmap();
    assert_eq!(day, bit(AC_G) | bit(LIGHT));

    clock.set(20 * 3600);
    assert_eq!(eval.tick(&gate).bitmap(), 0);

    // Clock lost: schedules hold their last state.
    clock.set(u32::MAX);
    assert_eq!(eval.tick(&gate).bitmap(), 0);
}

#[test]
fn co2_needs_both_low_reading_and_light_window() {
    let (ctx, _nvs) = loaded_context(&[
        ("co2_mode", AUTO),
        ("co2_sp", 1000),
        ("co2_db", 100),
        ("l_on_time_ts", 6 * 3600),
        ("l_off_time_ts", 18 * 3600),
    ]);
    let clock = FixedClock::at(3 * 3600);
    let gate = Gate::new();
    let mut eval = Evaluator::new(ctx.clone(), clock.clone());

    ctx.sensors.set(SensorId::Co2, 800);
    assert_eq!(eval.tick(&gate).bitmap() & bit(CO2), 0, "lights off");

    clock.set(9 * 3600);
    assert_ne!(eval.tick(&gate).bitmap() & bit(CO2), 0);

    ctx.sensors.set(SensorId::Co2, 1100);
    assert_eq!(eval.tick(&gate).bitmap() & bit(CO2), 0, "enough CO2");
}

#[test]
fn remote_mode_change_takes_effect_next_pass() {
    let (ctx, _nvs) = loaded_context(&[]);
    let router = MessageRouter::new(ctx.clone());
    let gate = Gate::new();
    let mut eval = Evaluator::new(ctx, FixedClock::at(0));

    assert_eq!(eval.tick(&gate).bitmap(), 0);
    router.dispatch("devices/1234567890ab/settings/dh_mode/set", b"1");
    assert_eq!(eval.tick(&gate).bitmap(), bit(DH));
    router.dispatch("devices/1234567890ab/settings/dh_mode/set", b"7");
    assert_eq!(eval.tick(&gate).bitmap(), 0, "unknown mode is OFF");
}

#[test]
fn write_failure_retries_with_latest_pass() {
    let (ctx, _nvs) = loaded_context(&[("ac_g_mode", MANUAL)]);
    let gate = Gate::new();
    let output = MockOutput::new();
    let mut eval = Evaluator::new(ctx.clone(), FixedClock::at(0));
    let mut drive = Driver::new(output.clone());

    output.set_failing(true);
    eval.tick(&gate);
    assert!(drive.drive_pending(&gate).unwrap().is_err());
    assert_eq!(gate.phase(), Phase::Faulted);
    assert!(drive.drive_pending(&gate).is_none(), "nothing re-signalled");

    // State changes while the hardware is down; the stale pass is gone.
    ctx.config.set("light_mode", MANUAL).unwrap();
    output.set_failing(false);
    eval.tick(&gate);
    assert_eq!(drive.drive_pending(&gate), Some(Ok(())));

    assert_eq!(output.history(), [bit(AC_G) | bit(LIGHT)]);
    assert_eq!(gate.phase(), Phase::Idle);
}

#[test]
fn unconsumed_passes_collapse_to_latest() {
    let (ctx, _nvs) = loaded_context(&[]);
    let gate = Gate::new();
    let output = MockOutput::new();
    let mut eval = Evaluator::new(ctx.clone(), FixedClock::at(0));
    let mut drive = Driver::new(output.clone());

    eval.tick(&gate);
    ctx.config.set("ac_g_mode", MANUAL).unwrap();
    eval.tick(&gate);
    ctx.config.set("light_mode", MANUAL).unwrap();
    eval.tick(&gate);

    drive.drive_pending(&gate).unwrap().unwrap();
    assert!(drive.drive_pending(&gate).is_none());
    assert_eq!(output.history(), [bit(AC_G) | bit(LIGHT)]);
}

#[test]
fn spawned_scheduler_drives_outputs() {
    let (ctx, _nvs) = loaded_context(&[("ac_y_mode", MANUAL)]);
    let gate = Arc::new(Gate::new());
    let output = MockOutput::new();
    let timing = Timing {
        tick: Duration::from_millis(20),
        report: Some(Duration::from_millis(50)),
    };

    scheduler::spawn(ctx, FixedClock::at(0), output.clone(), gate.clone(), timing).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while output.history().is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(output.history().first(), Some(&bit(AC_Y)));
    assert_eq!(gate.last_driven().map(|b| b & bit(AC_Y)), Some(bit(AC_Y)));
}
