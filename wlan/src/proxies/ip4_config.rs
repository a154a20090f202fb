//! IPv4 configuration proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};

/// Proxy for IPv4 configuration objects.
#[proxy(
    interface = "org.freedesktop.NetworkManager.IP4Config",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMIp4Config {
    /// Address entries, each a dictionary with `address` and `prefix`.
    #[zbus(property)]
    fn address_data(&self) -> Result<Vec<HashMap<String, zvariant::OwnedValue>>>;
}
