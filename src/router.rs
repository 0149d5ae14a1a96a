//! Inbound topic/payload router.
//!
//! Topics are `/`-separated paths; empty segments are skipped. Two
//! patterns are recognised anywhere along the path:
//!
//! ```text
//!   <key>/set          payload → ConfigStore[key]
//!   <sensor name>      payload → SensorValues[sensor]
//! ```
//!
//! e.g. `devices/1234567890ab/settings/co2_sp/set` with payload `650`
//! sets `co2_sp`; `devices/1234567890ab/sensors/temperature` with `231`
//! records 23.1 °C.
//!
//! Decoding is separate from applying: a message is fully decoded into a
//! list of [`Action`]s first, so a malformed topic or payload never
//! mutates anything. Everything that arrives here is untrusted.

use std::sync::Arc;

use log::{debug, warn};

use crate::app::context::RoomContext;
use crate::app::ports::StoragePort;
use crate::error::{ConfigError, MessageError};
use crate::sensors::SensorId;

/// Verb segment that writes the preceding key.
pub const SET_VERB: &str = "set";

/// Topics deeper than this are rejected outright.
pub const MAX_SEGMENTS: usize = 12;

/// One mutation decoded from a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Write a config parameter. The key is not checked against the
    /// registry until the action is applied.
    Set { key: &'a str, value: i32 },
    /// Record a sensor reading.
    Sensor { sensor: SensorId, value: i32 },
}

/// Decoded action list; never longer than the segment count.
pub type Actions<'a> = heapless::Vec<Action<'a>, MAX_SEGMENTS>;

/// Parse a payload as a base-10 `i32`, ignoring surrounding ASCII
/// whitespace.
pub fn parse_payload(payload: &[u8]) -> Result<i32, MessageError> {
    let text = core::str::from_utf8(payload).map_err(|_| MessageError::MalformedPayload)?;
    text.trim_ascii()
        .parse()
        .map_err(|_| MessageError::MalformedPayload)
}

/// Decode a message without touching any state.
pub fn decode<'a>(topic: &'a str, payload: &[u8]) -> Result<Actions<'a>, MessageError> {
    let mut segments: heapless::Vec<&str, MAX_SEGMENTS> = heapless::Vec::new();
    for segment in topic.split('/').filter(|s| !s.is_empty()) {
        segments
            .push(segment)
            .map_err(|_| MessageError::MalformedTopic)?;
    }

    let mut actions = Actions::new();
    let mut value = None;
    let mut previous: Option<&str> = None;

    for &segment in &segments {
        let action = if segment == SET_VERB {
            let key = previous.ok_or(MessageError::MalformedTopic)?;
            let value = *value.get_or_insert(parse_payload(payload)?);
            Some(Action::Set { key, value })
        } else if let Some(sensor) = SensorId::from_name(segment) {
            let value = *value.get_or_insert(parse_payload(payload)?);
            Some(Action::Sensor { sensor, value })
        } else {
            None
        };

        if let Some(action) = action {
            // One action per segment at most, so capacity is never exceeded.
            let _ = actions.push(action);
        }
        previous = Some(segment);
    }

    if actions.is_empty() {
        return Err(MessageError::MalformedTopic);
    }
    Ok(actions)
}

/// Applies decoded messages to the shared room context.
pub struct MessageRouter<S> {
    ctx: Arc<RoomContext<S>>,
}

impl<S> Clone for MessageRouter<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<S: StoragePort> MessageRouter<S> {
    pub fn new(ctx: Arc<RoomContext<S>>) -> Self {
        Self { ctx }
    }

    /// Decode and apply one message. Never fails outward: malformed input
    /// is dropped, unknown keys and persistence failures are logged.
    pub fn dispatch(&self, topic: &str, payload: &[u8]) {
        match decode(topic, payload) {
            Ok(actions) => {
                for action in actions {
                    self.apply(action);
                }
            }
            Err(e) => debug!("Router: dropped '{}' ({})", topic, e),
        }
    }

    fn apply(&self, action: Action<'_>) {
        match action {
            Action::Set { key, value } => match self.ctx.config.set(key, value) {
                Ok(()) => {}
                Err(ConfigError::KeyNotFound) => {
                    warn!("Router: ignoring set of unknown key '{}'", key);
                }
                Err(e) => {
                    warn!("Router: '{}' = {} applied but not persisted ({})", key, value, e);
                }
            },
            Action::Sensor { sensor, value } => {
                debug!("Router: {} = {}", sensor.name(), value);
                self.ctx.sensors.set(sensor, value);
            }
        }
    }
}
