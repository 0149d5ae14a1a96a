//! Process-lifetime shared state.

use crate::app::ports::StoragePort;
use crate::registry::ConfigStore;
use crate::sensors::SensorValues;

/// Everything the router writes and the control loop reads. Built once at
/// boot and shared behind an `Arc`.
pub struct RoomContext<S> {
    pub config: ConfigStore<S>,
    pub sensors: SensorValues,
}

impl<S: StoragePort> RoomContext<S> {
    /// Wrap an opened storage backend. Call `config.load()` before handing
    /// the context to other components.
    pub fn new(storage: S) -> Self {
        Self {
            config: ConfigStore::new(storage),
            sensors: SensorValues::new(),
        }
    }
}
