//! Thread placement and task supervision.

pub mod task_pin;
pub mod watchdog;
