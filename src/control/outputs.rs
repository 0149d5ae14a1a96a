//! Static output definitions.
//!
//! The index of an output is its bit in the hardware bitmap; the relay
//! board wires bit 0 to the HVAC fan terminal and so on down the table.

use super::hysteresis::Direction;
use crate::sensors::SensorId;

/// HVAC fan (G).
pub const AC_G: usize = 0;
/// Cooling stage (Y).
pub const AC_Y: usize = 1;
/// Heating stage (W).
pub const AC_W: usize = 2;
/// Dehumidifier.
pub const DH: usize = 3;
/// Exhaust fan.
pub const EF: usize = 4;
/// CO2 solenoid valve.
pub const CO2: usize = 5;
/// Circulation fan.
pub const CF: usize = 6;
/// Lighting contactor.
pub const LIGHT: usize = 7;

pub const NUM_OUTPUTS: usize = OUTPUT_DEFS.len();

// The hardware boundary is a single byte.
const _: () = assert!(NUM_OUTPUTS <= u8::BITS as usize);

/// Sensor and direction of an output's hysteresis block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HysteresisDef {
    pub sensor: SensorId,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputDef {
    pub key: &'static str,
    /// `None` leaves the hysteresis block disabled.
    pub hysteresis: Option<HysteresisDef>,
    pub schedule: bool,
}

const fn hyst(sensor: SensorId, direction: Direction) -> Option<HysteresisDef> {
    Some(HysteresisDef { sensor, direction })
}

pub const OUTPUT_DEFS: [OutputDef; 8] = [
    OutputDef { key: "ac_g", hysteresis: None, schedule: true },
    OutputDef {
        key: "ac_y",
        hysteresis: hyst(SensorId::Temperature, Direction::Reverse),
        schedule: false,
    },
    OutputDef {
        key: "ac_w",
        hysteresis: hyst(SensorId::Temperature, Direction::Forward),
        schedule: false,
    },
    // Rising-trigger: runs while humidity is above the band.
    OutputDef {
        key: "dh",
        hysteresis: hyst(SensorId::Humidity, Direction::Reverse),
        schedule: false,
    },
    OutputDef { key: "ef", hysteresis: None, schedule: false },
    OutputDef {
        key: "co2",
        hysteresis: hyst(SensorId::Co2, Direction::Forward),
        schedule: true,
    },
    OutputDef { key: "cf", hysteresis: None, schedule: true },
    OutputDef { key: "light", hysteresis: None, schedule: true },
];
