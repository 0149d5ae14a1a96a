//! I2C relay port expander.
//!
//! Implements [`OutputPort`] for a PCF8574-class quasi-bidirectional
//! expander: the whole output bitmap goes out as one data byte, bit `i`
//! to pin P`i`. Relay boards that energise on LOW are handled by
//! inverting the byte.

use embedded_hal::i2c::I2c;
use log::info;

use crate::app::ports::{OutputError, OutputPort};

pub struct ExpanderOutput<I2C> {
    i2c: I2C,
    address: u8,
    active_low: bool,
}

impl<I2C: I2c> ExpanderOutput<I2C> {
    /// Default PCF8574 address with A2..A0 tied low.
    pub const DEFAULT_ADDRESS: u8 = 0x20;

    pub fn new(i2c: I2C, address: u8, active_low: bool) -> Self {
        info!(
            "ExpanderOutput: addr {:#04x}, {}",
            address,
            if active_low { "active-low" } else { "active-high" }
        );
        Self {
            i2c,
            address,
            active_low,
        }
    }

    /// Byte actually put on the wire for `bitmap`.
    pub fn wire_byte(&self, bitmap: u8) -> u8 {
        if self.active_low { !bitmap } else { bitmap }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> OutputPort for ExpanderOutput<I2C> {
    fn write(&mut self, bitmap: u8) -> Result<(), OutputError> {
        let byte = self.wire_byte(bitmap);
        self.i2c
            .write(self.address, &[byte])
            .map_err(|_| OutputError::HardwareWriteFailure)
    }
}
