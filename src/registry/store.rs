//! Live parameter registry with write-through persistence.
//!
//! Values live in `AtomicI32` slots so the control loop can read them
//! without locking while the message-handling context writes. Reads are
//! relaxed: an evaluation pass sees any write that completed before it
//! started, which is all the control loop needs.
//!
//! The storage backend sits behind a mutex that only [`ConfigStore::load`]
//! and [`ConfigStore::set`] take; the evaluation path never touches it.

use core::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use serde::{Serialize, Serializer};

use super::params::{NUM_PARAMS, ParamId};
use crate::app::ports::StoragePort;
use crate::error::ConfigError;

/// Outcome of [`ConfigStore::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Keys whose persisted value was adopted.
    pub restored: usize,
    /// Keys absent from storage, initialised to 0.
    pub initialised: usize,
    /// Keys whose read or initial write failed; left at 0.
    pub failed: usize,
}

/// Fixed-key parameter store.
pub struct ConfigStore<S> {
    values: [AtomicI32; NUM_PARAMS],
    storage: Mutex<S>,
}

impl<S: StoragePort> ConfigStore<S> {
    /// Wrap an opened storage backend. Every value starts at 0 until
    /// [`load`](Self::load) runs.
    pub fn new(storage: S) -> Self {
        Self {
            values: core::array::from_fn(|_| AtomicI32::new(0)),
            storage: Mutex::new(storage),
        }
    }

    /// Adopt every persisted value; write 0 for keys that have never been
    /// stored. Individual key failures are logged and counted, never fatal.
    pub fn load(&self) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let mut storage = self.storage();

        for id in ParamId::all() {
            let key = id.key();
            match storage.get_i32(key) {
                Ok(Some(value)) => {
                    self.values[id.index()].store(value, Ordering::Relaxed);
                    summary.restored += 1;
                }
                Ok(None) => {
                    self.values[id.index()].store(0, Ordering::Relaxed);
                    match storage.set_i32(key, 0) {
                        Ok(()) => {
                            info!("ConfigStore: '{}' not initialised yet, set to 0", key);
                            summary.initialised += 1;
                        }
                        Err(e) => {
                            warn!("ConfigStore: initialising '{}' failed: {}", key, e);
                            summary.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!("ConfigStore: reading '{}' failed: {}", key, e);
                    summary.failed += 1;
                }
            }
        }

        if let Err(e) = storage.commit() {
            warn!("ConfigStore: commit after load failed: {}", e);
        }

        info!(
            "ConfigStore: loaded {} keys ({} restored, {} initialised, {} failed)",
            NUM_PARAMS, summary.restored, summary.initialised, summary.failed
        );
        summary
    }

    /// Resolve a key to its slot.
    pub fn lookup(&self, key: &str) -> Option<ParamId> {
        ParamId::from_key(key)
    }

    /// Live value of a resolved parameter.
    pub fn value(&self, id: ParamId) -> i32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }

    pub fn get(&self, key: &str) -> Result<i32, ConfigError> {
        self.lookup(key)
            .map(|id| self.value(id))
            .ok_or(ConfigError::KeyNotFound)
    }

    /// Update the live value, then write it through to storage.
    ///
    /// On [`ConfigError::PersistenceWriteFailure`] the live value keeps the
    /// new setting; it is not rolled back.
    pub fn set(&self, key: &str, value: i32) -> Result<(), ConfigError> {
        let id = self.lookup(key).ok_or(ConfigError::KeyNotFound)?;
        self.set_param(id, value)
    }

    /// [`set`](Self::set) for an already-resolved parameter.
    pub fn set_param(&self, id: ParamId, value: i32) -> Result<(), ConfigError> {
        // Under the storage lock, so live and persisted order agree.
        let mut storage = self.storage();
        self.values[id.index()].store(value, Ordering::Relaxed);
        let persisted = storage
            .set_i32(id.key(), value)
            .and_then(|()| storage.commit());

        match persisted {
            Ok(()) => {
                info!("ConfigStore: {} = {}", id.key(), value);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "ConfigStore: {} = {} (live only, persist failed: {})",
                    id.key(),
                    value,
                    e
                );
                Err(ConfigError::PersistenceWriteFailure)
            }
        }
    }

    /// Point-in-time copy of every key and value, in storage order.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let mut entries = heapless::Vec::new();
        for id in ParamId::all() {
            // Capacity equals NUM_PARAMS, so this never overflows.
            let _ = entries.push((id.key(), self.value(id)));
        }
        ConfigSnapshot { entries }
    }

    /// The snapshot as a single JSON object, e.g. `{"ac_g_mode":2,...}`.
    pub fn dump_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }

    fn storage(&self) -> MutexGuard<'_, S> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Every parameter at one instant. Serialises as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    entries: heapless::Vec<(&'static str, i32), NUM_PARAMS>,
}

impl ConfigSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, key: &str) -> Option<i32> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl Serialize for ConfigSnapshot {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self.iter())
    }
}
