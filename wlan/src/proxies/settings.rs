//! Saved connection profile proxies.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::{OwnedObjectPath, OwnedValue};

/// Settings of every saved connection profile.
pub type SavedSettings = HashMap<String, HashMap<String, OwnedValue>>;

/// Proxy for the settings service holding saved connection profiles.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Settings",
    default_service = "org.freedesktop.NetworkManager",
    default_path = "/org/freedesktop/NetworkManager/Settings"
)]
pub trait NMSettings {
    /// Paths of all saved connection profiles.
    fn list_connections(&self) -> Result<Vec<OwnedObjectPath>>;
}

/// Proxy for a single saved connection profile.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Settings.Connection",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMSettingsConnection {
    /// The profile's settings, without secrets.
    fn get_settings(&self) -> Result<SavedSettings>;

    /// Removes the profile permanently.
    fn delete(&self) -> Result<()>;
}
