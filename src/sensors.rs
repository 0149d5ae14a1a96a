//! Live sensor readings injected over MQTT.
//!
//! The room has no local sensor drivers: an external node publishes
//! readings to `<prefix><id>/.../<sensor name>`, the router stores them
//! here, and the control loop reads them each tick. Values are ×10 fixed
//! point for temperature (°C) and humidity (%RH); CO2 is in ppm, matching
//! the units of `co2_sp`.

use core::sync::atomic::{AtomicI32, Ordering};

/// Number of sensor channels.
pub const NUM_SENSORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorId {
    Temperature,
    Humidity,
    Co2,
}

impl SensorId {
    pub const ALL: [Self; NUM_SENSORS] = [Self::Temperature, Self::Humidity, Self::Co2];

    /// Topic segment naming this sensor.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Co2 => "co2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Latest reading per sensor. Starts at 0 until the first message.
pub struct SensorValues {
    readings: [AtomicI32; NUM_SENSORS],
}

impl Default for SensorValues {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorValues {
    pub const fn new() -> Self {
        Self {
            readings: [AtomicI32::new(0), AtomicI32::new(0), AtomicI32::new(0)],
        }
    }

    pub fn get(&self, sensor: SensorId) -> i32 {
        self.readings[sensor.index()].load(Ordering::Relaxed)
    }

    pub fn set(&self, sensor: SensorId, value: i32) {
        self.readings[sensor.index()].store(value, Ordering::Relaxed);
    }
}
