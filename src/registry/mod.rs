//! Configuration registry.
//!
//! [`params`] is the static key table and its output bindings; [`store`]
//! holds the live values and writes every change through to NVS.

pub mod params;
pub mod store;

pub use params::{MAX_KEY_LEN, NUM_PARAMS, OutputField, OutputParams, ParamId};
pub use store::{ConfigSnapshot, ConfigStore, LoadSummary};
