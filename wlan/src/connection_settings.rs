//! Saved connection profile management.
//!
//! NetworkManager keeps a profile for every network it has been asked to
//! join. Connecting reuses or replaces the profile for the SSID instead of
//! piling up duplicates.

use log::debug;
use zbus::Connection;
use zvariant::{OwnedObjectPath, Value};

use crate::Result;
use crate::models::WifiSecurity;
use crate::proxies::{NMSettingsConnectionProxy, NMSettingsProxy, SavedSettings};

/// What to do with an existing profile before connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SavedDecision {
    /// Activate the saved profile as is.
    UseSaved(OwnedObjectPath),
    /// Create a new profile, deleting the saved one first if there is one.
    RebuildFresh(Option<OwnedObjectPath>),
}

/// Reuses a saved profile only when no new credentials were given.
pub(crate) fn decide_saved_connection(
    saved: Option<OwnedObjectPath>,
    creds: &WifiSecurity,
) -> SavedDecision {
    match (saved, creds) {
        (Some(path), WifiSecurity::Open) => SavedDecision::UseSaved(path),
        (saved, _) => SavedDecision::RebuildFresh(saved),
    }
}

/// Whether saved `settings` describe the Wi-Fi network `ssid`.
///
/// Matches on the wireless SSID bytes, falling back to the profile id.
pub(crate) fn settings_match_ssid(settings: &SavedSettings, ssid: &str) -> bool {
    if let Some(wifi) = settings.get("802-11-wireless")
        && let Some(raw) = wifi.get("ssid")
        && let Value::Array(bytes) = &**raw
    {
        let bytes: Vec<u8> = bytes
            .iter()
            .filter_map(|b| match b {
                Value::U8(b) => Some(*b),
                _ => None,
            })
            .collect();
        return bytes == ssid.as_bytes();
    }

    matches!(
        settings.get("connection").and_then(|section| section.get("id")).map(|id| &**id),
        Some(Value::Str(id)) if id.as_str() == ssid
    )
}

/// Finds the saved profile for `ssid`, if any.
pub(crate) async fn get_saved_connection_path(
    conn: &Connection,
    ssid: &str,
) -> Result<Option<OwnedObjectPath>> {
    let settings = NMSettingsProxy::new(conn).await?;

    for path in settings.list_connections().await? {
        let profile = NMSettingsConnectionProxy::builder(conn)
            .path(path.clone())?
            .build()
            .await?;

        if settings_match_ssid(&profile.get_settings().await?, ssid) {
            debug!("Saved profile for '{ssid}': {}", path.as_str());
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Permanently removes a saved profile.
pub(crate) async fn delete_connection(conn: &Connection, path: OwnedObjectPath) -> Result<()> {
    let profile = NMSettingsConnectionProxy::builder(conn)
        .path(path.clone())?
        .build()
        .await?;
    profile.delete().await?;
    debug!("Deleted connection: {}", path.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use zvariant::OwnedValue;

    fn path(p: &str) -> OwnedObjectPath {
        OwnedObjectPath::try_from(p).unwrap()
    }

    fn owned(value: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(value).unwrap()
    }

    fn profile(id: &str, ssid: Option<&[u8]>) -> SavedSettings {
        let mut connection = HashMap::new();
        connection.insert("id".to_string(), owned(Value::from(id)));
        let mut settings = HashMap::new();
        settings.insert("connection".to_string(), connection);
        if let Some(ssid) = ssid {
            let mut wifi = HashMap::new();
            wifi.insert("ssid".to_string(), owned(Value::from(ssid.to_vec())));
            settings.insert("802-11-wireless".to_string(), wifi);
        }
        settings
    }

    #[test]
    fn saved_profile_reused_without_new_password() {
        let saved = path("/org/freedesktop/NetworkManager/Settings/3");
        assert_eq!(
            decide_saved_connection(Some(saved.clone()), &WifiSecurity::Open),
            SavedDecision::UseSaved(saved)
        );
    }

    #[test]
    fn new_password_replaces_saved_profile() {
        let saved = path("/org/freedesktop/NetworkManager/Settings/3");
        let creds = WifiSecurity::WpaPsk {
            psk: "password123".into(),
        };
        assert_eq!(
            decide_saved_connection(Some(saved.clone()), &creds),
            SavedDecision::RebuildFresh(Some(saved))
        );
        assert_eq!(
            decide_saved_connection(None, &WifiSecurity::Open),
            SavedDecision::RebuildFresh(None)
        );
    }

    #[test]
    fn matches_on_ssid_bytes_before_id() {
        assert!(settings_match_ssid(
            &profile("HomeNet 1", Some(b"HomeNet")),
            "HomeNet"
        ));
        assert!(!settings_match_ssid(
            &profile("HomeNet", Some(b"Other")),
            "HomeNet"
        ));
        assert!(settings_match_ssid(&profile("HomeNet", None), "HomeNet"));
        assert!(!settings_match_ssid(&profile("Wired 1", None), "HomeNet"));
    }
}
