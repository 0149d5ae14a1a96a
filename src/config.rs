//! System configuration parameters
//!
//! Board-level settings for the room controller. The control parameters
//! themselves live in the [`ConfigStore`](crate::registry::ConfigStore);
//! this struct only covers how the firmware talks to the world.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::MAX_KEY_LEN;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Messaging ---
    /// Prefix in front of the device id in every subscribed topic.
    pub topic_prefix: heapless::String<32>,
    /// MQTT broker URI, e.g. `mqtt://10.0.0.2:1883`.
    pub broker_url: heapless::String<96>,

    // --- Storage ---
    /// NVS namespace holding the parameter keys.
    pub nvs_namespace: heapless::String<16>,

    // --- Outputs ---
    /// 7-bit I2C address of the relay port expander.
    pub expander_address: u8,
    /// Relay board energises on a LOW pin.
    pub expander_active_low: bool,

    // --- Timing ---
    /// Evaluate period (milliseconds)
    pub tick_interval_ms: u32,
    /// Config dump period (seconds); 0 disables it.
    pub config_report_interval_secs: u32,
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    // Defaults below are literals well under capacity.
    let _ = out.push_str(s);
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            topic_prefix: fixed("devices/"),
            broker_url: fixed("mqtt://192.168.1.10:1883"),

            nvs_namespace: fixed("config"),

            expander_address: 0x20, // PCF8574, A2..A0 low
            expander_active_low: false,

            tick_interval_ms: 1000,           // 1 Hz
            config_report_interval_secs: 10,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic_prefix.contains(['#', '+']) {
            return Err(ConfigError::Invalid(
                "topic_prefix must not contain MQTT wildcards",
            ));
        }
        if self.broker_url.is_empty() {
            return Err(ConfigError::Invalid("broker_url must be set"));
        }
        if self.nvs_namespace.is_empty() || self.nvs_namespace.len() > MAX_KEY_LEN {
            return Err(ConfigError::Invalid("nvs_namespace must be 1–15 chars"));
        }
        if !(0x08..=0x77).contains(&self.expander_address) {
            return Err(ConfigError::Invalid(
                "expander_address must be a 7-bit address in 0x08–0x77",
            ));
        }
        if !(100..=10_000).contains(&self.tick_interval_ms) {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be 100–10000",
            ));
        }
        if self.config_report_interval_secs > 86_400 {
            return Err(ConfigError::Invalid(
                "config_report_interval_secs must be 0–86400",
            ));
        }
        Ok(())
    }

    /// Wildcard subscription for this device: `<prefix><device id>/#`.
    pub fn subscribe_pattern(&self, device_id: &str) -> heapless::String<64> {
        let mut topic = heapless::String::new();
        use core::fmt::Write;
        let _ = write!(topic, "{}{}/#", self.topic_prefix, device_id);
        topic
    }
}
