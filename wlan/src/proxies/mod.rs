//! D-Bus proxy traits for NetworkManager interfaces.
//!
//! These traits define the NetworkManager D-Bus API surface used by the
//! backend. The `zbus::proxy` macro generates proxy implementations that
//! handle D-Bus communication automatically.
//!
//! # NetworkManager D-Bus Structure
//!
//! - `/org/freedesktop/NetworkManager` - Main NM object
//! - `/org/freedesktop/NetworkManager/Devices/*` - Device objects
//! - `/org/freedesktop/NetworkManager/AccessPoint/*` - Access point objects
//! - `/org/freedesktop/NetworkManager/ActiveConnection/*` - Active connection objects
//! - `/org/freedesktop/NetworkManager/IP4Config/*` - IPv4 configuration objects
//! - `/org/freedesktop/NetworkManager/Settings` - Saved connection profiles
//!
//! Device and active connection both emit a `StateChanged` signal; each
//! proxy lives in its own module so the generated signal types do not
//! collide.

mod access_point;
mod active_connection;
mod device;
mod ip4_config;
mod main_nm;
mod settings;
mod wireless;

pub(crate) use access_point::NMAccessPointProxy;
pub(crate) use active_connection::NMActiveConnectionProxy;
pub(crate) use device::NMDeviceProxy;
pub(crate) use ip4_config::NMIp4ConfigProxy;
pub(crate) use main_nm::NMProxy;
pub(crate) use settings::{NMSettingsConnectionProxy, NMSettingsProxy, SavedSettings};
pub(crate) use wireless::NMWirelessProxy;
