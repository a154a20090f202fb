//! The platform service the plugin forwards calls to.

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::backend::WifiBackend;
use crate::call::PluginCall;
use crate::constants::args;
use crate::models::{
    AccessPoint, ConnectionError, DisconnectResult, IpResult, PluginError, ScanEntry, ScanResult,
    SsidResult, WifiSecurity,
};

/// Performs Wi-Fi actions on behalf of the plugin.
///
/// Every method takes ownership of the call and must resolve or reject it
/// exactly once, including translating platform failures.
#[async_trait]
pub trait WifiService: Send + Sync {
    async fn get_ip(&self, call: PluginCall);
    async fn get_ssid(&self, call: PluginCall);
    async fn connect(&self, call: PluginCall);
    async fn connect_prefix(&self, call: PluginCall);
    async fn disconnect(&self, call: PluginCall);
    async fn scan(&self, call: PluginCall);
}

/// [`WifiService`] that reads call arguments, drives a [`WifiBackend`] and
/// shapes the results for the bridge.
pub struct PlatformWifiService<B> {
    backend: B,
}

impl<B: WifiBackend> PlatformWifiService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads `ssid` and `password`. The plugin has already checked that
    /// `ssid` is present; here it must also be a string.
    fn credentials(call: &PluginCall) -> Result<(String, WifiSecurity), PluginError> {
        let ssid = call
            .get_string(args::SSID)
            .ok_or(PluginError::InvalidArgument {
                name: args::SSID,
                reason: "expected a string".into(),
            })?
            .to_string();

        let password = match call.get(args::PASSWORD) {
            None => None,
            Some(value) => Some(value.as_str().ok_or(PluginError::InvalidArgument {
                name: args::PASSWORD,
                reason: "expected a string".into(),
            })?),
        };

        Ok((ssid, WifiSecurity::from_password(password)))
    }

    async fn connect_prefix_inner(&self, call: &PluginCall) -> Result<String, PluginError> {
        let (prefix, security) = Self::credentials(call)?;

        if !self.backend.wifi_enabled().await? {
            return Err(ConnectionError::WifiDisabled.into());
        }

        if let Err(e) = self.backend.request_scan().await {
            warn!("Scan before prefix match failed: {e}");
        }
        let access_points = self.backend.list_access_points().await?;

        let target =
            strongest_with_prefix(&access_points, &prefix).ok_or(ConnectionError::NotFound)?;
        info!(
            "Prefix '{prefix}' matched '{}' via {}",
            target.ssid, target.bssid
        );

        self.backend.connect_access_point(target, &security).await?;
        Ok(target.ssid.clone())
    }

    async fn scan_inner(&self) -> Result<ScanResult, PluginError> {
        let start_scan_success = match self.backend.request_scan().await {
            Ok(()) => true,
            Err(ConnectionError::NoWifiDevice) => return Err(ConnectionError::NoWifiDevice.into()),
            Err(e) => {
                warn!("Wi-Fi scan request failed: {e}");
                false
            }
        };

        let (scan_success, scan_result) = match self.backend.list_access_points().await {
            Ok(aps) => (true, aps.iter().map(ScanEntry::from).collect()),
            Err(ConnectionError::NoWifiDevice) => return Err(ConnectionError::NoWifiDevice.into()),
            Err(e) => {
                warn!("Reading scan results failed: {e}");
                (false, Vec::new())
            }
        };

        Ok(ScanResult {
            start_scan_success,
            scan_success,
            scan_result,
        })
    }
}

/// Strongest access point whose SSID starts with `prefix`.
///
/// Hidden networks (empty SSID) never match.
pub(crate) fn strongest_with_prefix<'a>(
    access_points: &'a [AccessPoint],
    prefix: &str,
) -> Option<&'a AccessPoint> {
    access_points
        .iter()
        .filter(|ap| !ap.ssid.is_empty() && ap.ssid.starts_with(prefix))
        .max_by_key(|ap| ap.strength)
}

/// Resolves `call` with `result` or rejects it with the error.
fn settle<T: serde::Serialize>(call: PluginCall, result: Result<T, PluginError>) {
    match result {
        Ok(value) => call.resolve_with(&value),
        Err(e) => call.reject_error(&e),
    }
}

#[async_trait]
impl<B: WifiBackend> WifiService for PlatformWifiService<B> {
    async fn get_ip(&self, call: PluginCall) {
        let result = self
            .backend
            .current_ipv4()
            .await
            .map(|ip| IpResult { ip: ip.to_string() })
            .map_err(PluginError::from);
        settle(call, result);
    }

    async fn get_ssid(&self, call: PluginCall) {
        let result = match self.backend.current_ssid().await {
            Ok(Some(ssid)) => Ok(SsidResult { ssid }),
            Ok(None) => Err(ConnectionError::NotConnected.into()),
            Err(e) => Err(e.into()),
        };
        settle(call, result);
    }

    async fn connect(&self, call: PluginCall) {
        let result = match Self::credentials(&call) {
            Ok((ssid, security)) => {
                debug!("Connecting to '{ssid}' for call {}", call.id());
                self.backend
                    .connect(&ssid, &security)
                    .await
                    .map(|()| SsidResult { ssid })
                    .map_err(PluginError::from)
            }
            Err(e) => Err(e),
        };
        settle(call, result);
    }

    async fn connect_prefix(&self, call: PluginCall) {
        let result = self
            .connect_prefix_inner(&call)
            .await
            .map(|ssid| SsidResult { ssid });
        settle(call, result);
    }

    async fn disconnect(&self, call: PluginCall) {
        let result = self
            .backend
            .disconnect()
            .await
            .map(|()| DisconnectResult { disconnected: true })
            .map_err(PluginError::from);
        settle(call, result);
    }

    async fn scan(&self, call: PluginCall) {
        let result = self.scan_inner().await;
        settle(call, result);
    }
}
