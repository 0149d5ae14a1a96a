//! MessageRouter and the MQTT handler on top of it.

use crate::mock_hw::loaded_context;
use roomctl::adapters::mqtt::{MqttHandler, SimLink};
use roomctl::config::SystemConfig;
use roomctl::router::MessageRouter;
use roomctl::sensors::SensorId;

#[test]
fn set_topic_updates_registry_and_storage() {
    let (ctx, nvs) = loaded_context(&[]);
    let router = MessageRouter::new(ctx.clone());

    router.dispatch("devices/1234567890ab/settings/co2_sp/set", b"650");

    assert_eq!(ctx.config.get("co2_sp"), Ok(650));
    assert_eq!(nvs.stored("co2_sp"), Some(650));
}

#[test]
fn topic_without_verb_changes_nothing() {
    let (ctx, nvs) = loaded_context(&[("co2_sp", 400)]);
    let router = MessageRouter::new(ctx.clone());
    let before = ctx.config.snapshot();
    let commits = nvs.commits();

    router.dispatch("devices/1234567890ab/settings/co2_sp", b"650");

    assert_eq!(ctx.config.snapshot(), before);
    assert_eq!(nvs.commits(), commits);
}

#[test]
fn sensor_topic_updates_reading() {
    let (ctx, _nvs) = loaded_context(&[]);
    let router = MessageRouter::new(ctx.clone());

    router.dispatch("devices/1234567890ab/sensors/temperature", b"231");
    router.dispatch("devices/1234567890ab/sensors/co2", b"1180");

    assert_eq!(ctx.sensors.get(SensorId::Temperature), 231);
    assert_eq!(ctx.sensors.get(SensorId::Co2), 1180);
    assert_eq!(ctx.sensors.get(SensorId::Humidity), 0);
}

#[test]
fn malformed_payload_causes_zero_mutation() {
    let (ctx, nvs) = loaded_context(&[("rh_sp", 550)]);
    let router = MessageRouter::new(ctx.clone());
    let commits = nvs.commits();

    router.dispatch("devices/1234567890ab/settings/rh_sp/set", b"fifty");
    router.dispatch("devices/1234567890ab/sensors/humidity", b"");

    assert_eq!(ctx.config.get("rh_sp"), Ok(550));
    assert_eq!(ctx.sensors.get(SensorId::Humidity), 0);
    assert_eq!(nvs.commits(), commits);
}

#[test]
fn unknown_key_is_ignored() {
    let (ctx, nvs) = loaded_context(&[]);
    let router = MessageRouter::new(ctx.clone());
    let before = ctx.config.snapshot();

    router.dispatch("devices/1234567890ab/settings/bogus_key/set", b"1");

    assert_eq!(ctx.config.snapshot(), before);
    assert_eq!(nvs.stored("bogus_key"), None);
}

#[test]
fn persist_failure_still_applies_live_value() {
    let (ctx, nvs) = loaded_context(&[]);
    let router = MessageRouter::new(ctx.clone());
    nvs.set_fail_writes(true);

    router.dispatch("devices/1234567890ab/settings/ac_w_mode/set", b"1");

    assert_eq!(ctx.config.get("ac_w_mode"), Ok(1));
    assert_eq!(nvs.stored("ac_w_mode"), Some(0));
}

#[test]
fn link_resubscribes_on_every_connect_and_routes_messages() {
    let (ctx, _nvs) = loaded_context(&[]);
    let cfg = SystemConfig::default();
    let handler = MqttHandler::new(MessageRouter::new(ctx.clone()));
    let mut link = SimLink::new(cfg.subscribe_pattern("1234567890ab"), handler.clone());

    link.connect();
    handler.on_disconnected();
    link.connect();

    let subs = link.subscriptions();
    assert_eq!(subs.len(), 2);
    assert!(subs.iter().all(|s| s.as_str() == "devices/1234567890ab/#"));
    assert!(!handler.connect_pending());

    link.deliver("devices/1234567890ab/settings/light_mode/set", b"2");
    assert_eq!(ctx.config.get("light_mode"), Ok(2));

    handler.on_message(None, b"orphan chunk");
}
