//! Wi-Fi scanning and access point enumeration.

use log::{debug, warn};
use std::collections::HashMap;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::device::find_wifi_device;
use crate::models::AccessPoint;
use crate::proxies::{NMAccessPointProxy, NMWirelessProxy};
use crate::utils::{decode_ssid_or_empty, mode_to_string};

/// Requests a scan on the Wi-Fi device.
///
/// The scan runs asynchronously inside NetworkManager; results show up in
/// `list_access_points` once it settles.
pub(crate) async fn request_scan(conn: &Connection) -> Result<()> {
    let dp = find_wifi_device(conn).await?;
    let wifi = NMWirelessProxy::builder(conn).path(dp)?.build().await?;
    wifi.request_scan(HashMap::new()).await?;
    debug!("Scan requested");
    Ok(())
}

/// Lists every access point visible to the Wi-Fi device.
///
/// Unlike a network picker this keeps one entry per BSSID; consumers that
/// track signal levels need every radio, not one per SSID. Access points
/// that disappear while being read are skipped.
pub(crate) async fn list_access_points(conn: &Connection) -> Result<Vec<AccessPoint>> {
    let dp = find_wifi_device(conn).await?;
    let wifi = NMWirelessProxy::builder(conn).path(dp)?.build().await?;

    let mut access_points = Vec::new();
    for ap_path in wifi.get_all_access_points().await? {
        match read_access_point(conn, ap_path.clone()).await {
            Ok(ap) => access_points.push(ap),
            Err(e) => warn!("Skipping access point {}: {e}", ap_path.as_str()),
        }
    }

    debug!("Listed {} access points", access_points.len());
    Ok(access_points)
}

async fn read_access_point(conn: &Connection, path: OwnedObjectPath) -> Result<AccessPoint> {
    let ap = NMAccessPointProxy::builder(conn).path(path)?.build().await?;

    let ssid_bytes = ap.ssid().await?;
    let access_point = AccessPoint {
        ssid: decode_ssid_or_empty(&ssid_bytes),
        bssid: ap.hw_address().await?,
        frequency: ap.frequency().await?,
        strength: ap.strength().await?,
        flags: ap.flags().await?,
        wpa_flags: ap.wpa_flags().await?,
        rsn_flags: ap.rsn_flags().await?,
        mode: ap.mode().await?,
    };

    debug!(
        "AP {} '{}' {} MHz {}% mode={}",
        access_point.bssid,
        access_point.ssid,
        access_point.frequency,
        access_point.strength,
        mode_to_string(access_point.mode)
    );
    Ok(access_point)
}
