//! GPIO / peripheral pin assignments for the room controller board.
//!
//! Single source of truth for pin numbers. `main.rs` takes the matching
//! typed pins from `esp_idf_hal::peripherals::Pins`; keep the two in step.
//!
//! The board is an ESP32 with a LAN8720 RMII PHY (clock in on GPIO 0) and
//! a PCF8574 relay expander on the I²C bus.

// ---------------------------------------------------------------------------
// I²C bus (relay port expander)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 13;
pub const I2C_SCL_GPIO: i32 = 16;
/// Standard-mode bus clock; the expander tops out at 100 kHz.
pub const I2C_BAUD_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Ethernet PHY
// ---------------------------------------------------------------------------

/// Digital output: powers the PHY (active HIGH).
pub const PHY_POWER_GPIO: i32 = 12;
/// RMII reference clock input from the PHY.
pub const RMII_CLK_GPIO: i32 = 0;
/// SMI address of the LAN8720.
pub const PHY_ADDRESS: u32 = 0;
