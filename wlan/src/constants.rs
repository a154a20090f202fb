//! Constants for NetworkManager D-Bus interface values and plugin names.
//!
//! The numeric codes correspond to NetworkManager's D-Bus API for device
//! types, states and security flags. The string constants are the names the
//! host bridge and application code use to address the plugin.

/// Names shared with the host bridge.
pub mod bridge {
    /// Name the plugin is registered under.
    pub const PLUGIN_NAME: &str = "wifi";
    /// Alias of the location permission required for Wi-Fi introspection.
    pub const FINE_LOCATION_ALIAS: &str = "fineLocation";
    /// OS permission string grouped under [`FINE_LOCATION_ALIAS`].
    pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
}

/// Call argument keys.
pub mod args {
    pub const VALUE: &str = "value";
    pub const SSID: &str = "ssid";
    pub const PASSWORD: &str = "password";
}

/// Fixed rejection messages.
pub mod messages {
    pub const MISSING_SSID: &str = "Must provide an ssid";
    pub const PERMISSION_DENIED: &str = "User denied permission";
}

/// NetworkManager device type constants.
pub mod device_type {
    pub const WIFI: u32 = 2;
}

/// NetworkManager device state constants
pub mod device_state {
    pub const UNAVAILABLE: u32 = 20;
    pub const DISCONNECTED: u32 = 30;
    pub const ACTIVATED: u32 = 100;
}

/// WiFi security flag constants
pub mod security_flags {
    pub const WEP: u32 = 0x1;
    pub const PAIR_TKIP: u32 = 0x4;
    pub const PAIR_CCMP: u32 = 0x8;
    pub const PSK: u32 = 0x0100;
    pub const EAP: u32 = 0x0200;
    pub const SAE: u32 = 0x0400;
}

/// WiFi mode constants
pub mod wifi_mode {
    pub const ADHOC: u32 = 1;
    pub const INFRA: u32 = 2;
    pub const AP: u32 = 3;
}

/// Default timeouts
pub mod timeouts {
    use std::time::Duration;

    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
    pub const DISCONNECT_TIMEOUT_SECS: u64 = 10;
    pub const SCAN_WAIT_SECONDS: u64 = 3;

    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_TIMEOUT_SECS)
    }

    pub fn disconnect_timeout() -> Duration {
        Duration::from_secs(DISCONNECT_TIMEOUT_SECS)
    }

    pub fn scan_wait() -> Duration {
        Duration::from_secs(SCAN_WAIT_SECONDS)
    }
}

/// Signal strength conversion
pub mod signal_strength {
    /// dBm reported for a strength of 0%.
    pub const RSSI_FLOOR_DBM: i32 = -100;
}

/// WiFi frequency constants (MHz)
pub mod frequency {
    pub const BAND_2_4_START: u32 = 2412;
    pub const BAND_2_4_END: u32 = 2472;
    pub const BAND_2_4_CH14: u32 = 2484;
    pub const BAND_5_START: u32 = 5000;
    pub const BAND_5_END: u32 = 5900;
    pub const BAND_6_START: u32 = 5955;
    pub const BAND_6_END: u32 = 7115;
    pub const CHANNEL_SPACING: u32 = 5;
}
