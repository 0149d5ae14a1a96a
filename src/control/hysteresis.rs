//! Dual-threshold latch.
//!
//! Thresholds sit half a deadband either side of `setpoint + offset`:
//!
//! ```text
//!   on_at  = sp + os - direction * db / 2
//!   off_at = sp + os + direction * db / 2
//! ```
//!
//! A REVERSE block (cooling, dehumidifying) switches on once the reading
//! rises to `on_at` and holds while it stays at or above `off_at`. A
//! FORWARD block (heating, CO2 injection) is the mirror image. The set
//! condition dominates, so a misconfigured negative deadband still yields
//! a deterministic state.

use super::fixed::Fixed10;
use crate::sensors::SensorId;

/// Which way the actuator pushes the process variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Falling trigger: on when the reading drops to the low threshold.
    Forward,
    /// Rising trigger: on when the reading climbs to the high threshold.
    Reverse,
}

impl Direction {
    /// `+1` is FORWARD, `-1` is REVERSE, anything else has no meaning.
    pub const fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            1 => Some(Self::Forward),
            -1 => Some(Self::Reverse),
            _ => None,
        }
    }

    pub const fn sign(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HysteresisBlock {
    pub enabled: bool,
    /// Latched output; only [`update`](Self::update) changes it.
    pub state: bool,
    /// `None` is an undefined direction: the latch holds its state.
    pub direction: Option<Direction>,
    pub setpoint: Fixed10,
    pub deadband: Fixed10,
    pub offset: Fixed10,
    pub sensor: SensorId,
}

impl HysteresisBlock {
    pub const fn new(sensor: SensorId, direction: Option<Direction>) -> Self {
        Self {
            enabled: true,
            state: false,
            direction,
            setpoint: Fixed10::ZERO,
            deadband: Fixed10::ZERO,
            offset: Fixed10::ZERO,
            sensor,
        }
    }

    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(SensorId::Temperature, None)
        }
    }

    /// `(on_at, off_at)` in doubled raw units.
    fn thresholds(&self, direction: Direction) -> (i64, i64) {
        let centre = self.setpoint.doubled() + self.offset.doubled();
        let half_band = direction.sign() * self.deadband.raw() as i64;
        (centre - half_band, centre + half_band)
    }

    /// Feed one reading and return the new latch state.
    pub fn update(&mut self, reading: Fixed10) -> bool {
        let Some(direction) = self.direction else {
            return self.state;
        };
        let (on_at, off_at) = self.thresholds(direction);
        let pv = reading.doubled();

        self.state = match direction {
            Direction::Reverse => pv >= on_at || (self.state && pv >= off_at),
            Direction::Forward => pv <= on_at || (self.state && pv <= off_at),
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(direction: Direction, sp: i32, db: i32, os: i32) -> HysteresisBlock {
        HysteresisBlock {
            setpoint: Fixed10::from_raw(sp),
            deadband: Fixed10::from_raw(db),
            offset: Fixed10::from_raw(os),
            ..HysteresisBlock::new(SensorId::Temperature, Some(direction))
        }
    }

    fn feed(b: &mut HysteresisBlock, readings: &[i32]) -> Vec<bool> {
        readings
            .iter()
            .map(|&r| b.update(Fixed10::from_raw(r)))
            .collect()
    }

    #[test]
    fn reverse_latches_between_thresholds() {
        // sp 20.0, db 1.0 → on at 20.5, off below 19.5
        let mut b = block(Direction::Reverse, 200, 10, 0);
        let rising = feed(&mut b, &[190, 200, 204, 205, 210]);
        assert_eq!(rising, [false, false, false, true, true]);

        let falling = feed(&mut b, &[200, 196, 195, 194, 200]);
        assert_eq!(falling, [true, true, true, false, false]);
    }

    #[test]
    fn forward_mirrors_reverse() {
        // on at 19.5, holds until above 20.5
        let mut b = block(Direction::Forward, 200, 10, 0);
        let falling = feed(&mut b, &[210, 200, 196, 195, 190]);
        assert_eq!(falling, [false, false, false, true, true]);

        let rising = feed(&mut b, &[200, 205, 206, 200]);
        assert_eq!(rising, [true, true, false, false]);
    }

    #[test]
    fn offset_shifts_both_thresholds() {
        // sp 20.0 + os 1.0, db 1.0 → on at 21.5, off below 20.5
        let mut b = block(Direction::Reverse, 200, 10, 10);
        assert_eq!(feed(&mut b, &[210, 214, 215, 205, 204]), [false, false, true, true, false]);
    }

    #[test]
    fn odd_deadband_is_exact() {
        // db 0.3 → on at 20.15: 20.1 is below, 20.2 is above
        let mut b = block(Direction::Reverse, 200, 3, 0);
        assert!(!b.update(Fixed10::from_raw(201)));
        assert!(b.update(Fixed10::from_raw(202)));
    }

    #[test]
    fn undefined_direction_holds_state() {
        let mut b = block(Direction::Reverse, 200, 10, 0);
        b.direction = None;
        b.state = true;
        assert!(b.update(Fixed10::from_raw(-400)));
        b.state = false;
        assert!(!b.update(Fixed10::from_raw(900)));
    }

    #[test]
    fn direction_from_raw() {
        assert_eq!(Direction::from_raw(1), Some(Direction::Forward));
        assert_eq!(Direction::from_raw(-1), Some(Direction::Reverse));
        assert_eq!(Direction::from_raw(0), None);
    }
}
