//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                      |
//! |-------------|--------------|----------------------------------|
//! | `nvs`       | StoragePort  | NVS namespace / in-memory map    |
//! | `expander`  | OutputPort   | PCF8574 over `embedded_hal` I²C  |
//! | `time`      | ClockPort    | libc wall clock (SNTP-synced)    |
//! | `mqtt`      | (inbound)    | ESP-MQTT client → MessageRouter  |
//! | `device_id` | (none)       | Ethernet MAC                     |

pub mod device_id;
pub mod expander;
pub mod mqtt;
pub mod nvs;
pub mod time;
