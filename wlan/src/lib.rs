//! A permission-gated Wi-Fi plugin for host application bridges.
//!
//! The bridge hands the plugin a [`PluginCall`] naming one of a fixed set of
//! operations:
//!
//! - `echo`: returns its `value` argument
//! - `getIP`, `getSSID`: current IPv4 address and network name
//! - `connect`, `connectPrefix`: join a network by exact SSID or by prefix
//! - `disconnect`: leave the current network
//! - `scan`: list visible access points
//!
//! Operations that expose network details need the `fineLocation`
//! permission. When it is missing, [`WifiPlugin`] asks the
//! [`PermissionHost`] for it and resumes the same operation once the request
//! has been answered, or rejects with `User denied permission`.
//!
//! The actual Wi-Fi work is done by a [`WifiService`]. The standard one,
//! [`PlatformWifiService`], drives a typed [`WifiBackend`];
//! [`NetworkManagerBackend`] implements it over NetworkManager's D-Bus API.
//!
//! # Example
//!
//! ```no_run
//! use wlan::{AlwaysGranted, JsonObject, NetworkManagerBackend, PlatformWifiService, PluginCall, WifiPlugin};
//!
//! # async fn example() -> wlan::Result<()> {
//! let backend = NetworkManagerBackend::new().await?;
//! let plugin = WifiPlugin::new(PlatformWifiService::new(backend), AlwaysGranted);
//!
//! let (call, handle) = PluginCall::new("scan", JsonObject::new());
//! plugin.handle(call).await;
//! match handle.outcome().await {
//!     Ok(result) => println!("{}", serde_json::Value::Object(result)),
//!     Err(rejection) => eprintln!("scan failed: {rejection}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. Install a logger
//! such as `env_logger` in the host to see its output.

// Internal implementation modules
mod connection;
mod connection_settings;
mod constants;
mod device;
mod network_info;
mod proxies;
mod scan;
mod state_wait;
mod utils;
mod wifi_builders;

// Public API modules
pub mod backend;
pub mod call;
pub mod models;
pub mod network_manager;
pub mod operation;
pub mod permission;
pub mod plugin;
pub mod scan_source;
pub mod service;

// Re-exported public API
pub use backend::WifiBackend;
pub use call::{CallHandle, CallResult, JsonObject, PluginCall, Rejection};
pub use constants::{args, bridge, messages};
pub use models::{
    AccessPoint, ActiveConnectionState, ConnectionError, ConnectionStateReason, DisconnectResult,
    EchoResult, IpResult, PluginError, ScanEntry, ScanResult, SsidResult, TimeoutConfig,
    WifiSecurity, connection_state_reason_to_error,
};
pub use network_manager::NetworkManagerBackend;
pub use operation::Operation;
pub use permission::{
    AlwaysGranted, DECLARED, FINE_LOCATION, Permission, PermissionHost, PermissionState,
    permission_states,
};
pub use plugin::WifiPlugin;
pub use scan_source::{
    AccessPointReading, ScanFrame, ScanSource, ScanSourceError, ScanSourceOptions,
};
pub use service::{PlatformWifiService, WifiService};

/// A specialized `Result` type for platform operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
