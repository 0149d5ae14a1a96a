//! Control evaluation: fixed-point math, the two sub-blocks, and the
//! per-output engine that arbitrates between them.

pub mod engine;
pub mod fixed;
pub mod hysteresis;
pub mod outputs;
pub mod schedule;

pub use engine::{ControlEngine, Mode, Output, OutputStates};
pub use fixed::Fixed10;
pub use hysteresis::{Direction, HysteresisBlock};
pub use outputs::{NUM_OUTPUTS, OUTPUT_DEFS};
pub use schedule::ScheduleBlock;
