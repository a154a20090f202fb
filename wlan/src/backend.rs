use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::Result;
use crate::models::{AccessPoint, WifiSecurity};

/// Typed access to the platform's Wi-Fi stack.
///
/// [`PlatformWifiService`](crate::PlatformWifiService) drives one of these
/// and turns its results into call resolutions.
/// [`NetworkManagerBackend`](crate::NetworkManagerBackend) is the Linux
/// implementation.
#[async_trait]
pub trait WifiBackend: Send + Sync {
    /// Whether the Wi-Fi radio is switched on.
    async fn wifi_enabled(&self) -> Result<bool>;

    /// Asks the device to scan and waits for the scan to settle.
    async fn request_scan(&self) -> Result<()>;

    /// Lists every access point currently visible.
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>>;

    /// SSID of the associated network, or `None` when not associated.
    async fn current_ssid(&self) -> Result<Option<String>>;

    /// IPv4 address of the Wi-Fi interface.
    async fn current_ipv4(&self) -> Result<Ipv4Addr>;

    /// Connects to `ssid` and returns once the connection is up.
    async fn connect(&self, ssid: &str, security: &WifiSecurity) -> Result<()>;

    /// Connects through an access point from a recent
    /// [`list_access_points`](Self::list_access_points) without scanning again.
    async fn connect_access_point(&self, ap: &AccessPoint, security: &WifiSecurity) -> Result<()>;

    /// Disconnects the Wi-Fi interface.
    async fn disconnect(&self) -> Result<()>;
}
