use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{messages, timeouts};

/// NetworkManager active connection state.
///
/// These values represent the lifecycle states of an active connection
/// as reported by the NM D-Bus API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveConnectionState {
    /// Connection state is unknown.
    Unknown,
    /// Connection is activating (connecting).
    Activating,
    /// Connection is fully activated (connected).
    Activated,
    /// Connection is deactivating (disconnecting).
    Deactivating,
    /// Connection is fully deactivated (disconnected).
    Deactivated,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ActiveConnectionState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Activating,
            2 => Self::Activated,
            3 => Self::Deactivating,
            4 => Self::Deactivated,
            v => Self::Other(v),
        }
    }
}

impl Display for ActiveConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// NetworkManager active connection state reason codes.
///
/// Indicates why an active connection transitioned to its current state.
/// Use `ConnectionStateReason::from(code)` on the raw value carried by the
/// `StateChanged` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStateReason {
    Unknown,
    None,
    UserDisconnected,
    DeviceDisconnected,
    ServiceStopped,
    IpConfigInvalid,
    ConnectTimeout,
    ServiceStartTimeout,
    ServiceStartFailed,
    NoSecrets,
    LoginFailed,
    ConnectionRemoved,
    DependencyFailed,
    DeviceRealizeFailed,
    DeviceRemoved,
    /// Unknown reason code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ConnectionStateReason {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::None,
            2 => Self::UserDisconnected,
            3 => Self::DeviceDisconnected,
            4 => Self::ServiceStopped,
            5 => Self::IpConfigInvalid,
            6 => Self::ConnectTimeout,
            7 => Self::ServiceStartTimeout,
            8 => Self::ServiceStartFailed,
            9 => Self::NoSecrets,
            10 => Self::LoginFailed,
            11 => Self::ConnectionRemoved,
            12 => Self::DependencyFailed,
            13 => Self::DeviceRealizeFailed,
            14 => Self::DeviceRemoved,
            v => Self::Other(v),
        }
    }
}

impl Display for ConnectionStateReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::None => write!(f, "none"),
            Self::UserDisconnected => write!(f, "user disconnected"),
            Self::DeviceDisconnected => write!(f, "device disconnected"),
            Self::ServiceStopped => write!(f, "service stopped"),
            Self::IpConfigInvalid => write!(f, "IP configuration invalid"),
            Self::ConnectTimeout => write!(f, "connection timed out"),
            Self::ServiceStartTimeout => write!(f, "service start timed out"),
            Self::ServiceStartFailed => write!(f, "service start failed"),
            Self::NoSecrets => write!(f, "no secrets (password) provided"),
            Self::LoginFailed => write!(f, "login/authentication failed"),
            Self::ConnectionRemoved => write!(f, "connection was removed"),
            Self::DependencyFailed => write!(f, "dependency failed"),
            Self::DeviceRealizeFailed => write!(f, "device realization failed"),
            Self::DeviceRemoved => write!(f, "device was removed"),
            Self::Other(v) => write!(f, "unknown reason ({v})"),
        }
    }
}

/// Converts a connection state reason code to a specific `ConnectionError`.
///
/// Maps authentication failures to `AuthFailed`, timeouts to `Timeout`,
/// invalid IP configuration to `DhcpFailed` and everything else to
/// `ConnectionFailed`.
pub fn connection_state_reason_to_error(code: u32) -> ConnectionError {
    let reason = ConnectionStateReason::from(code);
    match reason {
        ConnectionStateReason::NoSecrets | ConnectionStateReason::LoginFailed => {
            ConnectionError::AuthFailed
        }
        ConnectionStateReason::ConnectTimeout | ConnectionStateReason::ServiceStartTimeout => {
            ConnectionError::Timeout
        }
        ConnectionStateReason::IpConfigInvalid => ConnectionError::DhcpFailed,
        _ => ConnectionError::ConnectionFailed(reason),
    }
}

/// Wi-Fi connection security types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiSecurity {
    Open,
    WpaPsk { psk: String },
}

impl WifiSecurity {
    /// Picks the security type from an optional password argument.
    ///
    /// A missing or empty password means an open network.
    pub fn from_password(password: Option<&str>) -> Self {
        match password {
            Some(psk) if !psk.is_empty() => WifiSecurity::WpaPsk {
                psk: psk.to_string(),
            },
            _ => WifiSecurity::Open,
        }
    }

    pub fn secured(&self) -> bool {
        !matches!(self, WifiSecurity::Open)
    }

    pub fn is_psk(&self) -> bool {
        matches!(self, WifiSecurity::WpaPsk { .. })
    }
}

/// One access point seen by the Wi-Fi device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub bssid: String,
    /// Operating frequency in MHz.
    pub frequency: u32,
    /// Signal strength as percentage (0-100).
    pub strength: u8,
    pub flags: u32,
    pub wpa_flags: u32,
    pub rsn_flags: u32,
    pub mode: u32,
}

/// Timeouts applied by the NetworkManager backend.
///
/// ```
/// use std::time::Duration;
/// use wlan::TimeoutConfig;
///
/// let config = TimeoutConfig::new()
///     .with_connection_timeout(Duration::from_secs(60))
///     .with_scan_wait(Duration::from_secs(5));
/// assert_eq!(config.connection_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// How long to wait for a connection to reach the activated state.
    pub connection_timeout: Duration,
    /// How long to wait for the device to report disconnected.
    pub disconnect_timeout: Duration,
    /// How long to let a requested scan settle before reading results.
    pub scan_wait: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connection_timeout: timeouts::connection_timeout(),
            disconnect_timeout: timeouts::disconnect_timeout(),
            scan_wait: timeouts::scan_wait(),
        }
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.disconnect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_scan_wait(mut self, wait: Duration) -> Self {
        self.scan_wait = wait;
        self
    }
}

/// Result of `echo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoResult {
    pub value: serde_json::Value,
}

/// Result of `getIP`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpResult {
    pub ip: String,
}

/// Result of `getSSID`, `connect` and `connectPrefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsidResult {
    pub ssid: String,
}

/// Result of `disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectResult {
    pub disconnected: bool,
}

/// Result of `scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Whether the scan request was accepted by the device.
    pub start_scan_success: bool,
    /// Whether the access point list could be read.
    pub scan_success: bool,
    pub scan_result: Vec<ScanEntry>,
}

/// One network in a [`ScanResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub bssid: String,
    pub ssid: String,
    pub frequency: u32,
    pub capabilities: String,
    /// Estimated RSSI in dBm.
    pub signal_level: i32,
}

impl From<&AccessPoint> for ScanEntry {
    fn from(ap: &AccessPoint) -> Self {
        Self {
            bssid: ap.bssid.clone(),
            ssid: ap.ssid.clone(),
            frequency: ap.frequency,
            capabilities: crate::utils::capabilities(ap),
            signal_level: crate::utils::strength_to_rssi(ap.strength),
        }
    }
}

/// Errors raised by the Wi-Fi platform layer.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A D-Bus value did not have the expected type.
    #[error("unexpected D-Bus value: {0}")]
    Variant(#[from] zvariant::Error),

    /// The requested network was not found during scan.
    #[error("network not found")]
    NotFound,

    /// Authentication with the access point failed.
    #[error("authentication failed")]
    AuthFailed,

    /// DHCP failed to obtain an IP address.
    #[error("DHCP failed")]
    DhcpFailed,

    /// The connection timed out waiting for activation.
    #[error("connection timeout")]
    Timeout,

    /// The device is stuck in an unexpected state.
    #[error("connection stuck in state: {0}")]
    Stuck(String),

    /// No Wi-Fi device was found on the system.
    #[error("no Wi-Fi device found")]
    NoWifiDevice,

    /// The Wi-Fi radio is switched off.
    #[error("Wi-Fi is disabled")]
    WifiDisabled,

    /// The device is not associated with any access point.
    #[error("not connected to a Wi-Fi network")]
    NotConnected,

    /// The device has no IPv4 address.
    #[error("no IP address assigned")]
    NoIpAddress,

    /// The SSID cannot be used (empty or longer than 32 bytes).
    #[error("invalid SSID: {0}")]
    InvalidSsid(String),

    /// The WPA passphrase is not 8 to 63 characters long.
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    /// A connection activation failure with a connection state reason.
    #[error("connection activation failed: {0}")]
    ConnectionFailed(ConnectionStateReason),
}

impl ConnectionError {
    /// Stable code attached to rejections carrying this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dbus(_) | Self::Variant(_) => "DBUS_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::AuthFailed => "AUTH_FAILED",
            Self::DhcpFailed => "DHCP_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::Stuck(_) => "STUCK",
            Self::NoWifiDevice => "NO_WIFI_DEVICE",
            Self::WifiDisabled => "WIFI_DISABLED",
            Self::NotConnected => "NOT_CONNECTED",
            Self::NoIpAddress => "NO_IP_ADDRESS",
            Self::InvalidSsid(_) | Self::InvalidPassword(_) => "INVALID_ARGUMENT",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
        }
    }
}

/// Errors raised by the plugin entry point and surfaced as call rejections.
#[derive(Debug, Error)]
pub enum PluginError {
    /// `connect` or `connectPrefix` was called without an `ssid`.
    #[error("{}", messages::MISSING_SSID)]
    MissingSsid,

    /// The user denied the permission prompt.
    #[error("{}", messages::PERMISSION_DENIED)]
    PermissionDenied,

    /// The bridge invoked a method the plugin does not expose.
    #[error("Method not implemented: {0}")]
    Unimplemented(String),

    /// An argument was present but unusable.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The platform layer failed; the message is passed through untouched.
    #[error(transparent)]
    Platform(#[from] ConnectionError),
}

impl PluginError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSsid => "MISSING_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Unimplemented(_) => "UNIMPLEMENTED",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Platform(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_security_from_password() {
        assert_eq!(WifiSecurity::from_password(None), WifiSecurity::Open);
        assert_eq!(WifiSecurity::from_password(Some("")), WifiSecurity::Open);
        let psk = WifiSecurity::from_password(Some("password123"));
        assert!(psk.secured());
        assert!(psk.is_psk());
        assert!(!WifiSecurity::Open.secured());
    }

    #[test]
    fn active_connection_state_from_u32() {
        assert_eq!(
            ActiveConnectionState::from(1),
            ActiveConnectionState::Activating
        );
        assert_eq!(
            ActiveConnectionState::from(2),
            ActiveConnectionState::Activated
        );
        assert_eq!(
            ActiveConnectionState::from(4),
            ActiveConnectionState::Deactivated
        );
        assert_eq!(
            ActiveConnectionState::from(99),
            ActiveConnectionState::Other(99)
        );
        assert_eq!(
            format!("{}", ActiveConnectionState::Other(42)),
            "unknown state (42)"
        );
    }

    #[test]
    fn connection_state_reason_to_error_mapping() {
        assert!(matches!(
            connection_state_reason_to_error(9),
            ConnectionError::AuthFailed
        ));
        assert!(matches!(
            connection_state_reason_to_error(10),
            ConnectionError::AuthFailed
        ));
        assert!(matches!(
            connection_state_reason_to_error(6),
            ConnectionError::Timeout
        ));
        assert!(matches!(
            connection_state_reason_to_error(5),
            ConnectionError::DhcpFailed
        ));
        match connection_state_reason_to_error(2) {
            ConnectionError::ConnectionFailed(reason) => {
                assert_eq!(reason, ConnectionStateReason::UserDisconnected);
            }
            other => panic!("expected ConnectionFailed, got {other:?}"),
        }
    }

    #[test]
    fn plugin_error_messages_are_fixed() {
        assert_eq!(PluginError::MissingSsid.to_string(), "Must provide an ssid");
        assert_eq!(
            PluginError::PermissionDenied.to_string(),
            "User denied permission"
        );
        assert_eq!(
            PluginError::Unimplemented("fly".into()).to_string(),
            "Method not implemented: fly"
        );
    }

    #[test]
    fn platform_errors_pass_through_verbatim() {
        let err = PluginError::from(ConnectionError::NotFound);
        assert_eq!(err.to_string(), "network not found");
        assert_eq!(err.code(), "NOT_FOUND");

        let err = PluginError::from(ConnectionError::ConnectionFailed(
            ConnectionStateReason::NoSecrets,
        ));
        assert_eq!(
            err.to_string(),
            "connection activation failed: no secrets (password) provided"
        );
        assert_eq!(err.code(), "CONNECTION_FAILED");
    }

    #[test]
    fn scan_result_serializes_with_bridge_field_names() {
        let result = ScanResult {
            start_scan_success: true,
            scan_success: true,
            scan_result: vec![ScanEntry {
                bssid: "aa:bb:cc:dd:ee:ff".into(),
                ssid: "HomeNet".into(),
                frequency: 2437,
                capabilities: "[ESS]".into(),
                signal_level: -60,
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["startScanSuccess"], true);
        assert_eq!(json["scanSuccess"], true);
        assert_eq!(json["scanResult"][0]["signal_level"], -60);
        assert_eq!(json["scanResult"][0]["ssid"], "HomeNet");
    }

    #[test]
    fn timeout_config_builder() {
        let config = TimeoutConfig::new()
            .with_connection_timeout(Duration::from_secs(60))
            .with_disconnect_timeout(Duration::from_secs(20));
        assert_eq!(config.connection_timeout, Duration::from_secs(60));
        assert_eq!(config.disconnect_timeout, Duration::from_secs(20));
        assert_eq!(config.scan_wait, timeouts::scan_wait());
    }
}
