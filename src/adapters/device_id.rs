//! Device identity: the Ethernet MAC as 12 lowercase hex digits, e.g.
//! `1234567890ab`. Used as the MQTT client id and as the topic segment
//! after the prefix in every message addressed to this controller.

use core::fmt::Write;

pub type DeviceIdString = heapless::String<12>;

pub type MacAddress = [u8; 6];

/// MAC of the Ethernet interface. Falls back to the eFuse base MAC if the
/// interface MAC cannot be derived.
#[cfg(feature = "espidf")]
pub fn read_mac() -> MacAddress {
    use esp_idf_svc::sys::{
        ESP_OK, esp_efuse_mac_get_default, esp_err_t, esp_mac_type_t_ESP_MAC_ETH, esp_read_mac,
    };

    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is 6 writable bytes, which is what both calls fill.
    let ret = unsafe { esp_read_mac(mac.as_mut_ptr(), esp_mac_type_t_ESP_MAC_ETH) };
    if ret != ESP_OK as esp_err_t {
        log::warn!("DeviceId: ETH MAC unavailable ({}), using base MAC", ret);
        unsafe { esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    }
    mac
}

/// Simulation: a fixed MAC so topics are stable across test runs.
#[cfg(not(feature = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x12, 0x34, 0x56, 0x78, 0x90, 0xAB]
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    for byte in mac {
        // Capacity is exactly 6 × 2 digits.
        let _ = write!(id, "{:02x}", byte);
    }
    id
}
