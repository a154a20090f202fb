//! NetworkManager device proxy.

use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for NetworkManager device interface.
///
/// Provides access to device properties like interface name, type, state,
/// and the IPv4 configuration currently applied.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMDevice {
    /// The network interface name (e.g., "wlan0").
    #[zbus(property)]
    fn interface(&self) -> Result<String>;

    /// Device type as a numeric code (2 = Wi-Fi).
    #[zbus(property)]
    fn device_type(&self) -> Result<u32>;

    /// Current device state (30 = disconnected, 100 = activated).
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Path to the IPv4 configuration ("/" when none is applied).
    #[zbus(property)]
    fn ip4_config(&self) -> Result<OwnedObjectPath>;

    /// Disconnects the device and prevents it from auto-activating.
    fn disconnect(&self) -> Result<()>;

    /// Signal emitted when device state changes.
    ///
    /// Named `device_state_changed` to avoid clashing with the `state`
    /// property's change stream.
    #[zbus(signal, name = "StateChanged")]
    fn device_state_changed(&self, new_state: u32, old_state: u32, reason: u32);
}
