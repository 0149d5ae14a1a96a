//! Wall-clock adapter.
//!
//! Provides the local time-of-day for schedule blocks.
//!
//! - **`feature = "espidf"`**: `gettimeofday()` + `localtime_r()`, so the
//!   `TZ` set in sdkconfig applies. Times before 2020 are treated as
//!   "not synced yet" (SNTP has not run).
//! - **otherwise**: `std::time::SystemTime`, in UTC.

use crate::app::ports::ClockPort;
use crate::control::schedule::SECONDS_PER_DAY;

/// Anything earlier than 2020-01-01 is an unsynchronised RTC.
const EPOCH_2020: i64 = 1_577_836_800;

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(feature = "espidf")]
impl ClockPort for SystemClock {
    fn seconds_of_day(&self) -> Option<u32> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        if (tv.tv_sec as i64) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        let ctod = tm.tm_hour * 3600 + tm.tm_min * 60 + tm.tm_sec;
        u32::try_from(ctod)
            .ok()
            .filter(|&s| s < SECONDS_PER_DAY)
    }
}

#[cfg(not(feature = "espidf"))]
impl ClockPort for SystemClock {
    fn seconds_of_day(&self) -> Option<u32> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        let secs = i64::try_from(now.as_secs()).ok()?;
        if secs < EPOCH_2020 {
            return None;
        }
        Some((secs % i64::from(SECONDS_PER_DAY)) as u32)
    }
}
