use async_trait::async_trait;
use futures_timer::Delay;
use std::net::Ipv4Addr;
use zbus::Connection;

use crate::Result;
use crate::backend::WifiBackend;
use crate::connection::{connect, connect_bssid, disconnect};
use crate::device::{find_wifi_device, wifi_enabled};
use crate::models::{AccessPoint, TimeoutConfig, WifiSecurity};
use crate::network_info::{current_ipv4, current_ssid_on};
use crate::scan::{list_access_points, request_scan};

/// [`WifiBackend`] on top of NetworkManager over D-Bus.
///
/// Works on the first Wi-Fi device NetworkManager reports.
#[derive(Clone)]
pub struct NetworkManagerBackend {
    conn: Connection,
    timeouts: TimeoutConfig,
}

impl NetworkManagerBackend {
    /// Connects to the system D-Bus with default timeouts.
    pub async fn new() -> Result<Self> {
        Self::with_config(TimeoutConfig::default()).await
    }

    /// Connects to the system D-Bus with custom timeouts.
    pub async fn with_config(timeouts: TimeoutConfig) -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn, timeouts })
    }

    /// Returns the timeouts in effect.
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeouts
    }
}

#[async_trait]
impl WifiBackend for NetworkManagerBackend {
    async fn wifi_enabled(&self) -> Result<bool> {
        wifi_enabled(&self.conn).await
    }

    async fn request_scan(&self) -> Result<()> {
        request_scan(&self.conn).await?;
        Delay::new(self.timeouts.scan_wait).await;
        Ok(())
    }

    async fn list_access_points(&self) -> Result<Vec<AccessPoint>> {
        list_access_points(&self.conn).await
    }

    async fn current_ssid(&self) -> Result<Option<String>> {
        let dp = find_wifi_device(&self.conn).await?;
        current_ssid_on(&self.conn, &dp).await
    }

    async fn current_ipv4(&self) -> Result<Ipv4Addr> {
        current_ipv4(&self.conn).await
    }

    async fn connect(&self, ssid: &str, security: &WifiSecurity) -> Result<()> {
        connect(&self.conn, ssid, security, &self.timeouts).await
    }

    async fn connect_access_point(&self, ap: &AccessPoint, security: &WifiSecurity) -> Result<()> {
        connect_bssid(&self.conn, &ap.ssid, &ap.bssid, security, &self.timeouts).await
    }

    async fn disconnect(&self) -> Result<()> {
        disconnect(&self.conn, &self.timeouts).await
    }
}
