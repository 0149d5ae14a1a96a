//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] over one NVS namespace holding `i32` values.
//!
//! - **`feature = "espidf"`**: `nvs_flash_init` + `nvs_open` at
//!   construction, `nvs_get_i32` / `nvs_set_i32` / `nvs_commit` per call.
//! - **otherwise**: an in-memory map with the same key rules, for host
//!   tests and simulation.

use crate::app::ports::{StorageError, StoragePort};
use crate::registry::MAX_KEY_LEN;
use log::info;

#[cfg(not(feature = "espidf"))]
use std::collections::HashMap;

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::warn;

/// NUL-terminated copy of a key or namespace, as NVS wants it.
type CKey = [u8; MAX_KEY_LEN + 1];

fn c_key(key: &str) -> Result<CKey, StorageError> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_KEY_LEN || bytes.contains(&0) {
        return Err(StorageError::InvalidKey);
    }
    let mut buf = [0u8; MAX_KEY_LEN + 1];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

pub struct NvsAdapter {
    namespace: heapless::String<16>,
    #[cfg(feature = "espidf")]
    handle: nvs_handle_t,
    #[cfg(not(feature = "espidf"))]
    store: HashMap<String, i32>,
    #[cfg(not(feature = "espidf"))]
    commits: usize,
}

impl NvsAdapter {
    /// Initialise NVS flash and open `namespace` read-write.
    ///
    /// Returns `Err(StorageError::InitFailed)` if flash initialisation or
    /// the namespace open fails. On first boot or after a version mismatch
    /// the NVS partition is erased and re-initialised automatically.
    pub fn open(namespace: &str) -> Result<Self, StorageError> {
        let ns = c_key(namespace).map_err(|_| StorageError::InitFailed)?;
        let mut name = heapless::String::new();
        name.push_str(namespace)
            .map_err(|()| StorageError::InitFailed)?;

        #[cfg(feature = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS
            // access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                let erased = unsafe { nvs_flash_erase() } == ESP_OK as esp_err_t;
                if !erased || unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(StorageError::InitFailed);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(StorageError::InitFailed);
            }

            let mut handle: nvs_handle_t = 0;
            let ret = unsafe {
                nvs_open(
                    ns.as_ptr() as *const _,
                    nvs_open_mode_t_NVS_READWRITE,
                    &mut handle,
                )
            };
            if ret != ESP_OK as esp_err_t {
                warn!("NVS: open '{}' failed ({})", namespace, ret);
                return Err(StorageError::InitFailed);
            }
            info!("NvsAdapter: namespace '{}' open", namespace);

            Ok(Self {
                namespace: name,
                handle,
            })
        }

        #[cfg(not(feature = "espidf"))]
        {
            let _ = ns;
            info!("NvsAdapter: simulation backend ('{}')", namespace);
            Ok(Self {
                namespace: name,
                store: HashMap::new(),
                commits: 0,
            })
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of commits issued (simulation only).
    #[cfg(not(feature = "espidf"))]
    pub fn commits(&self) -> usize {
        self.commits
    }
}

#[cfg(feature = "espidf")]
impl Drop for NvsAdapter {
    fn drop(&mut self) {
        unsafe { nvs_close(self.handle) };
    }
}

impl StoragePort for NvsAdapter {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError> {
        let k = c_key(key)?;

        #[cfg(feature = "espidf")]
        {
            let mut value: i32 = 0;
            let ret = unsafe { nvs_get_i32(self.handle, k.as_ptr() as *const _, &mut value) };
            if ret == ESP_OK as esp_err_t {
                Ok(Some(value))
            } else if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                Ok(None)
            } else {
                Err(StorageError::Io)
            }
        }

        #[cfg(not(feature = "espidf"))]
        {
            let _ = k;
            Ok(self.store.get(key).copied())
        }
    }

    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        let k = c_key(key)?;

        #[cfg(feature = "espidf")]
        {
            let ret = unsafe { nvs_set_i32(self.handle, k.as_ptr() as *const _, value) };
            if ret != ESP_OK as esp_err_t {
                return Err(StorageError::Io);
            }
            Ok(())
        }

        #[cfg(not(feature = "espidf"))]
        {
            let _ = k;
            self.store.insert(key.to_owned(), value);
            Ok(())
        }
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        #[cfg(feature = "espidf")]
        {
            if unsafe { nvs_commit(self.handle) } != ESP_OK as esp_err_t {
                return Err(StorageError::Io);
            }
            Ok(())
        }

        #[cfg(not(feature = "espidf"))]
        {
            self.commits += 1;
            Ok(())
        }
    }
}
