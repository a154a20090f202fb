//! Active connection proxy.

use zbus::{Result, proxy};

/// Proxy for active connection interface.
///
/// Use `receive_activation_state_changed()` to follow an activation until it
/// settles.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Connection.Active",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMActiveConnection {
    /// Current state of the active connection (2 = activated, 4 = deactivated).
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Signal emitted when the connection activation state changes.
    #[zbus(signal, name = "StateChanged")]
    fn activation_state_changed(&self, state: u32, reason: u32);
}
