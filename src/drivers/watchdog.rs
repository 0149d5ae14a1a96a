//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the evaluate loop stalls. The task that creates
//! the [`Watchdog`] is the one subscribed, so build it on the scheduler
//! thread and `feed()` it every tick.

use core::time::Duration;

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

/// Lower bound on the timeout, whatever the tick.
const MIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Watchdog {
    #[cfg(feature = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Timeout for a loop running every `tick`: three missed ticks, at
    /// least [`MIN_TIMEOUT`].
    pub fn timeout_for(tick: Duration) -> Duration {
        (tick * 3).max(MIN_TIMEOUT)
    }

    /// Configure the TWDT and subscribe the current task.
    pub fn subscribe(timeout: Duration) -> Self {
        #[cfg(feature = "espidf")]
        {
            let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as esp_err_t {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK as esp_err_t;
                if subscribed {
                    log::info!(
                        "Watchdog: subscribed ({} ms timeout, panic on trigger)",
                        timeout_ms
                    );
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(feature = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({:?} timeout)", timeout);
            Self {}
        }
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(feature = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
