use futures_timer::Delay;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::connection_settings::{
    SavedDecision, decide_saved_connection, delete_connection, get_saved_connection_path,
};
use crate::device::{ensure_wifi_enabled, find_wifi_device};
use crate::models::{ConnectionError, TimeoutConfig, WifiSecurity};
use crate::network_info::current_ssid_on;
use crate::proxies::{NMAccessPointProxy, NMDeviceProxy, NMProxy, NMWirelessProxy};
use crate::state_wait::{wait_for_connection_activation, wait_for_device_disconnect};
use crate::utils::{decode_ssid_or_empty, validate_security, validate_ssid};
use crate::wifi_builders::build_wifi_connection;

/// Which visible access point a connection should go through.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ApTarget<'a> {
    /// Strongest access point advertising this SSID.
    Ssid(&'a str),
    /// The access point with this hardware address.
    Bssid(&'a str),
}

impl ApTarget<'_> {
    pub(crate) fn matches(&self, ssid: &str, bssid: &str) -> bool {
        match self {
            Self::Ssid(target) => ssid == *target,
            Self::Bssid(target) => bssid.eq_ignore_ascii_case(target),
        }
    }
}

/// Connects to a Wi-Fi network.
///
/// The flow:
/// 1. Validate the SSID and credentials
/// 2. Find the Wi-Fi device and make sure the radio is on
/// 3. Return early if already associated with `ssid`
/// 4. Scan and resolve the strongest access point for `ssid`
/// 5. Reuse or replace the saved profile and activate it
/// 6. Wait for the active connection to reach the activated state
pub(crate) async fn connect(
    conn: &Connection,
    ssid: &str,
    creds: &WifiSecurity,
    timeouts: &TimeoutConfig,
) -> Result<()> {
    let Some(wifi_device) = prepare(conn, ssid, creds).await? else {
        return Ok(());
    };

    let wifi = NMWirelessProxy::builder(conn)
        .path(wifi_device.clone())?
        .build()
        .await?;
    let specific_object = scan_and_resolve_ap(conn, &wifi, ssid, timeouts).await?;

    activate(conn, wifi_device, specific_object, ssid, creds, timeouts).await
}

/// Connects through the access point `bssid` seen in a recent scan.
///
/// Skips the scan that [`connect`] performs.
pub(crate) async fn connect_bssid(
    conn: &Connection,
    ssid: &str,
    bssid: &str,
    creds: &WifiSecurity,
    timeouts: &TimeoutConfig,
) -> Result<()> {
    let Some(wifi_device) = prepare(conn, ssid, creds).await? else {
        return Ok(());
    };

    let wifi = NMWirelessProxy::builder(conn)
        .path(wifi_device.clone())?
        .build()
        .await?;
    let specific_object = find_ap(conn, &wifi, ApTarget::Bssid(bssid)).await?;
    debug!("Using access point {bssid} for '{ssid}'");

    activate(conn, wifi_device, specific_object, ssid, creds, timeouts).await
}

/// Validates the request and finds the device to connect on.
///
/// Returns `None` when already associated with `ssid`.
async fn prepare(
    conn: &Connection,
    ssid: &str,
    creds: &WifiSecurity,
) -> Result<Option<OwnedObjectPath>> {
    validate_ssid(ssid)?;
    validate_security(creds)?;

    debug!(
        "Connecting to '{}' | secured={} is_psk={}",
        ssid,
        creds.secured(),
        creds.is_psk()
    );

    ensure_wifi_enabled(conn).await?;
    let wifi_device = find_wifi_device(conn).await?;

    if let Some(active) = current_ssid_on(conn, &wifi_device).await? {
        if active == ssid {
            debug!("Already connected to {active}, skipping connect()");
            return Ok(None);
        }
        debug!("Currently connected to: {active}");
    }

    Ok(Some(wifi_device))
}

/// Activates a saved or fresh profile for `ssid` and waits for it.
///
/// A fresh profile that fails to activate is deleted again.
async fn activate(
    conn: &Connection,
    wifi_device: OwnedObjectPath,
    specific_object: OwnedObjectPath,
    ssid: &str,
    creds: &WifiSecurity,
    timeouts: &TimeoutConfig,
) -> Result<()> {
    let nm = NMProxy::new(conn).await?;
    let saved = get_saved_connection_path(conn, ssid).await?;

    match decide_saved_connection(saved, creds) {
        SavedDecision::UseSaved(saved) => {
            debug!("Activating saved profile {}", saved.as_str());
            let active_conn = nm
                .activate_connection(saved, wifi_device, specific_object)
                .await
                .map_err(|e| {
                    error!("activate_connection() failed: {e}");
                    e
                })?;

            debug!("Waiting for {} to activate...", active_conn.as_str());
            wait_for_connection_activation(conn, &active_conn, timeouts.connection_timeout)
                .await?;
        }
        SavedDecision::RebuildFresh(stale) => {
            if let Some(stale) = stale {
                debug!("Replacing saved profile for '{ssid}'");
                delete_connection(conn, stale).await?;
            }

            let settings = build_wifi_connection(ssid, creds, true);
            let (profile, active_conn) = nm
                .add_and_activate_connection(settings, wifi_device, specific_object)
                .await
                .map_err(|e| {
                    error!("add_and_activate_connection() failed: {e}");
                    e
                })?;

            debug!("Waiting for {} to activate...", active_conn.as_str());
            if let Err(e) =
                wait_for_connection_activation(conn, &active_conn, timeouts.connection_timeout)
                    .await
            {
                if let Err(cleanup) = delete_connection(conn, profile).await {
                    warn!("Could not delete failed profile for '{ssid}': {cleanup}");
                }
                return Err(e);
            }
        }
    }

    info!("Connected to '{ssid}'");
    Ok(())
}

/// Disconnects the Wi-Fi device and waits for it to settle.
///
/// Disconnecting a device that is not connected succeeds.
pub(crate) async fn disconnect(conn: &Connection, timeouts: &TimeoutConfig) -> Result<()> {
    let dp = find_wifi_device(conn).await?;
    let dev = NMDeviceProxy::builder(conn).path(dp)?.build().await?;

    if let Err(e) = dev.disconnect().await {
        // NM answers NotActive when nothing is connected.
        warn!("Disconnect call failed: {e}");
    }

    wait_for_device_disconnect(&dev, timeouts.disconnect_timeout).await?;
    info!("Wi-Fi device disconnected");
    Ok(())
}

/// Finds the access point for `target` on the wireless device.
///
/// When several match, the one with the strongest signal wins. Returns
/// `NotFound` if none is visible.
async fn find_ap(
    conn: &Connection,
    wifi: &NMWirelessProxy<'_>,
    target: ApTarget<'_>,
) -> Result<OwnedObjectPath> {
    let mut best: Option<(OwnedObjectPath, u8)> = None;

    for ap_path in wifi.get_all_access_points().await? {
        let ap = NMAccessPointProxy::builder(conn)
            .path(ap_path.clone())?
            .build()
            .await?;

        let ssid = decode_ssid_or_empty(&ap.ssid().await?);
        let bssid = ap.hw_address().await?;
        if !target.matches(&ssid, &bssid) {
            continue;
        }

        let strength = ap.strength().await?;
        if best.as_ref().is_none_or(|(_, s)| strength > *s) {
            best = Some((ap_path, strength));
        }
    }

    best.map(|(path, _)| path).ok_or(ConnectionError::NotFound)
}

/// Triggers a scan, lets it settle, then finds the target access point.
async fn scan_and_resolve_ap(
    conn: &Connection,
    wifi: &NMWirelessProxy<'_>,
    ssid: &str,
    timeouts: &TimeoutConfig,
) -> Result<OwnedObjectPath> {
    match wifi.request_scan(HashMap::new()).await {
        Ok(_) => debug!("Scan requested successfully"),
        Err(e) => warn!("Scan request failed: {e}"),
    }

    Delay::new(timeouts.scan_wait).await;

    let ap = find_ap(conn, wifi, ApTarget::Ssid(ssid)).await?;
    debug!("Matched target SSID '{ssid}'");
    Ok(ap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssid_target_matches_exact_name_only() {
        let target = ApTarget::Ssid("HomeNet");
        assert!(target.matches("HomeNet", "aa:bb:cc:dd:ee:01"));
        assert!(!target.matches("HomeNet-5G", "aa:bb:cc:dd:ee:01"));
        assert!(!target.matches("", "aa:bb:cc:dd:ee:01"));
    }

    #[test]
    fn bssid_target_ignores_case_and_ssid() {
        let target = ApTarget::Bssid("AA:BB:CC:DD:EE:01");
        assert!(target.matches("HomeNet", "aa:bb:cc:dd:ee:01"));
        assert!(target.matches("Other", "AA:BB:CC:DD:EE:01"));
        assert!(!target.matches("HomeNet", "aa:bb:cc:dd:ee:02"));
    }
}
