//! Wi-Fi device lookup.
//!
//! The backend works on the first NetworkManager device of type Wi-Fi; these
//! helpers locate it and check that the radio is usable.

use log::debug;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::constants::device_type;
use crate::models::ConnectionError;
use crate::proxies::{NMDeviceProxy, NMProxy};

/// Finds the first Wi-Fi device on the system.
///
/// Returns `NoWifiDevice` if none is found.
pub(crate) async fn find_wifi_device(conn: &Connection) -> Result<OwnedObjectPath> {
    let nm = NMProxy::new(conn).await?;

    for dp in nm.get_devices().await? {
        let dev = NMDeviceProxy::builder(conn)
            .path(dp.clone())?
            .build()
            .await?;
        if dev.device_type().await? == device_type::WIFI {
            debug!(
                "Using Wi-Fi device {} ({})",
                dev.interface().await.unwrap_or_default(),
                dp.as_str()
            );
            return Ok(dp);
        }
    }
    Err(ConnectionError::NoWifiDevice)
}

/// Returns whether Wi-Fi is globally enabled.
pub(crate) async fn wifi_enabled(conn: &Connection) -> Result<bool> {
    let nm = NMProxy::new(conn).await?;
    Ok(nm.wireless_enabled().await?)
}

/// Fails with `WifiDisabled` when the radio is switched off.
pub(crate) async fn ensure_wifi_enabled(conn: &Connection) -> Result<()> {
    if wifi_enabled(conn).await? {
        Ok(())
    } else {
        Err(ConnectionError::WifiDisabled)
    }
}
