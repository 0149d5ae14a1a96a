//! Application core: pure domain wiring, zero I/O.
//!
//! [`context`] owns the live parameters and sensor readings shared by the
//! router and the control loop. All interaction with hardware happens
//! through the **port traits** defined in [`ports`].

pub mod context;
pub mod ports;
