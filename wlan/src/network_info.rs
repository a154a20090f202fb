//! Current connection status.
//!
//! Provides the SSID of the associated access point and the IPv4 address of
//! the Wi-Fi device.

use log::debug;
use std::net::Ipv4Addr;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::constants::device_state;
use crate::device::find_wifi_device;
use crate::models::ConnectionError;
use crate::proxies::{NMAccessPointProxy, NMDeviceProxy, NMIp4ConfigProxy, NMWirelessProxy};
use crate::utils::decode_ssid_or_empty;

/// Returns the SSID of the access point the Wi-Fi device `dp` is associated with.
///
/// `Ok(None)` means the device has no active access point. D-Bus failures
/// are returned as is.
pub(crate) async fn current_ssid_on(
    conn: &Connection,
    dp: &OwnedObjectPath,
) -> Result<Option<String>> {
    let wifi = NMWirelessProxy::builder(conn)
        .path(dp.clone())?
        .build()
        .await?;

    let active_ap = wifi.active_access_point().await?;
    if active_ap.as_str() == "/" {
        debug!("No active access point on {}", dp.as_str());
        return Ok(None);
    }

    let ap = NMAccessPointProxy::builder(conn)
        .path(active_ap)?
        .build()
        .await?;
    let ssid = decode_ssid_or_empty(&ap.ssid().await?);
    Ok(if ssid.is_empty() { None } else { Some(ssid) })
}

/// Only an activated device has an address worth reporting.
pub(crate) fn require_activated(state: u32) -> Result<()> {
    if state == device_state::ACTIVATED {
        Ok(())
    } else {
        debug!("Wi-Fi device state is {state}, no address to report");
        Err(ConnectionError::NoIpAddress)
    }
}

/// Returns the first IPv4 address applied to the Wi-Fi device.
///
/// # Errors
///
/// `NoIpAddress` when the device is not activated or has no IPv4
/// configuration.
pub(crate) async fn current_ipv4(conn: &Connection) -> Result<Ipv4Addr> {
    let dp = find_wifi_device(conn).await?;
    let dev = NMDeviceProxy::builder(conn).path(dp)?.build().await?;

    require_activated(dev.state().await?)?;

    let config_path = dev.ip4_config().await?;
    if config_path.as_str() == "/" {
        return Err(ConnectionError::NoIpAddress);
    }

    let ip4 = NMIp4ConfigProxy::builder(conn)
        .path(config_path)?
        .build()
        .await?;

    for entry in ip4.address_data().await? {
        let Some(value) = entry.get("address") else {
            continue;
        };
        let address = String::try_from(value.try_clone()?)?;
        match address.parse::<Ipv4Addr>() {
            Ok(addr) => return Ok(addr),
            Err(e) => debug!("Skipping unparsable address '{address}': {e}"),
        }
    }

    Err(ConnectionError::NoIpAddress)
}
