//! ConfigStore against the mock NVS and the simulated NVS adapter.

use crate::mock_hw::{MockNvs, loaded_context};
use roomctl::adapters::nvs::NvsAdapter;
use roomctl::app::context::RoomContext;
use roomctl::error::ConfigError;
use roomctl::registry::{NUM_PARAMS, ParamId};

#[test]
fn boot_restores_persisted_and_initialises_missing() {
    let (ctx, nvs) = loaded_context(&[("d_temp_sp", 245), ("ac_y_mode", 2)]);

    assert_eq!(ctx.config.get("d_temp_sp"), Ok(245));
    assert_eq!(ctx.config.get("ac_y_mode"), Ok(2));
    assert_eq!(ctx.config.get("rh_sp"), Ok(0));

    // Every key now exists in storage; persisted values are untouched.
    for id in ParamId::all() {
        assert!(nvs.stored(id.key()).is_some(), "{} not initialised", id.key());
    }
    assert_eq!(nvs.stored("d_temp_sp"), Some(245));
}

#[test]
fn set_is_visible_and_persisted_before_returning() {
    let (ctx, nvs) = loaded_context(&[]);
    let commits_after_load = nvs.commits();

    ctx.config.set("cool_db", 15).unwrap();

    assert_eq!(ctx.config.get("cool_db"), Ok(15));
    assert_eq!(nvs.stored("cool_db"), Some(15));
    assert_eq!(nvs.commits(), commits_after_load + 1);
}

#[test]
fn second_boot_sees_first_boot_writes() {
    let (ctx, nvs) = loaded_context(&[]);
    ctx.config.set("co2_sp", 900).unwrap();
    drop(ctx);

    let reboot = RoomContext::new(nvs.clone());
    let summary = reboot.config.load();
    assert_eq!(summary.restored, NUM_PARAMS);
    assert_eq!(reboot.config.get("co2_sp"), Ok(900));
}

#[test]
fn persistence_failure_is_reported_without_rollback() {
    let (ctx, nvs) = loaded_context(&[("rh_sp", 500)]);
    nvs.set_fail_writes(true);

    assert_eq!(
        ctx.config.set("rh_sp", 620),
        Err(ConfigError::PersistenceWriteFailure)
    );
    assert_eq!(ctx.config.get("rh_sp"), Ok(620));
    assert_eq!(nvs.stored("rh_sp"), Some(500));
}

#[test]
fn key_set_is_fixed() {
    let (ctx, nvs) = loaded_context(&[]);
    assert_eq!(ctx.config.set("new_key", 1), Err(ConfigError::KeyNotFound));
    assert_eq!(ctx.config.get("new_key"), Err(ConfigError::KeyNotFound));
    assert_eq!(nvs.stored("new_key"), None);
    assert_eq!(ctx.config.snapshot().iter().count(), NUM_PARAMS);
}

#[test]
fn failed_initial_write_is_counted() {
    let nvs = MockNvs::new();
    nvs.set_fail_writes(true);
    let ctx = RoomContext::new(nvs);
    let summary = ctx.config.load();
    assert_eq!(summary.failed, NUM_PARAMS);
    assert_eq!(ctx.config.get("co2_sp"), Ok(0));
}

#[test]
fn dump_json_reflects_live_values() {
    let (ctx, _nvs) = loaded_context(&[("co2_sp", 650)]);
    let json = ctx.config.dump_json();
    assert!(json.contains("\"co2_sp\":650"), "{json}");
    assert!(json.contains("\"light_mode\":0"), "{json}");
}

#[test]
fn works_over_simulated_nvs_adapter() {
    let nvs = NvsAdapter::open("config").unwrap();
    let ctx = RoomContext::new(nvs);
    let summary = ctx.config.load();
    assert_eq!(summary.initialised, NUM_PARAMS);

    ctx.config.set("l_on_time_ts", 21_600).unwrap();
    assert_eq!(ctx.config.get("l_on_time_ts"), Ok(21_600));
}

#[test]
fn unreadable_storage_leaves_defaults_and_writes_nothing() {
    let nvs = MockNvs::with(&[("co2_sp", 900)]);
    nvs.set_fail_reads(true);
    let ctx = RoomContext::new(nvs.clone());

    let summary = ctx.config.load();

    assert_eq!(summary.failed, NUM_PARAMS);
    assert_eq!(summary.restored + summary.initialised, 0);
    assert_eq!(ctx.config.get("co2_sp"), Ok(0));
    assert_eq!(nvs.set_calls(), 0);
    assert_eq!(nvs.stored("co2_sp"), Some(900));
}
