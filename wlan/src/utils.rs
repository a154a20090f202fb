//! Utility functions for Wi-Fi data conversion.
//!
//! Helpers for converting between Wi-Fi data representations: frequency to
//! channel, strength to RSSI, security flags to capability strings, SSID
//! bytes to strings. Also holds the input validation applied before any
//! D-Bus traffic.

use log::warn;
use std::str;

use crate::Result;
use crate::constants::{frequency, security_flags, signal_strength, wifi_mode};
use crate::models::{AccessPoint, ConnectionError, WifiSecurity};

/// Maximum SSID length in bytes (IEEE 802.11).
const MAX_SSID_BYTES: usize = 32;

/// Converts a Wi-Fi frequency in MHz to a channel number.
///
/// Supports 2.4GHz (channels 1-14), 5GHz, and 6GHz bands.
/// Returns `None` for frequencies outside known Wi-Fi bands.
pub(crate) fn channel_from_freq(mhz: u32) -> Option<u16> {
    match mhz {
        frequency::BAND_2_4_START..=frequency::BAND_2_4_END => {
            Some(((mhz - frequency::BAND_2_4_START) / frequency::CHANNEL_SPACING + 1) as u16)
        }
        frequency::BAND_2_4_CH14 => Some(14),
        frequency::BAND_5_START..=frequency::BAND_5_END => {
            Some(((mhz - frequency::BAND_5_START) / frequency::CHANNEL_SPACING) as u16)
        }
        frequency::BAND_6_START..=frequency::BAND_6_END => {
            Some(((mhz - frequency::BAND_6_START) / frequency::CHANNEL_SPACING + 1) as u16)
        }
        _ => None,
    }
}

/// Converts NetworkManager's 0-100 strength to an RSSI estimate in dBm.
pub(crate) fn strength_to_rssi(strength: u8) -> i32 {
    i32::from(strength.min(100)) / 2 + signal_strength::RSSI_FLOOR_DBM
}

/// Builds an Android style capability string (`[WPA2-PSK-CCMP][ESS]`).
pub(crate) fn capabilities(ap: &AccessPoint) -> String {
    let mut caps = String::new();

    for (label, bits) in [("WPA", ap.wpa_flags), ("WPA2", ap.rsn_flags)] {
        if bits == 0 {
            continue;
        }
        let mut key_mgmt = Vec::new();
        if bits & security_flags::PSK != 0 {
            key_mgmt.push("PSK");
        }
        if bits & security_flags::EAP != 0 {
            key_mgmt.push("EAP");
        }
        if bits & security_flags::SAE != 0 {
            key_mgmt.push("SAE");
        }
        let mut cipher = Vec::new();
        if bits & security_flags::PAIR_CCMP != 0 {
            cipher.push("CCMP");
        }
        if bits & security_flags::PAIR_TKIP != 0 {
            cipher.push("TKIP");
        }

        caps.push('[');
        caps.push_str(label);
        if !key_mgmt.is_empty() {
            caps.push('-');
            caps.push_str(&key_mgmt.join("+"));
        }
        if !cipher.is_empty() {
            caps.push('-');
            caps.push_str(&cipher.join("+"));
        }
        caps.push(']');
    }

    if ap.flags & security_flags::WEP != 0 && ap.wpa_flags == 0 && ap.rsn_flags == 0 {
        caps.push_str("[WEP]");
    }

    caps.push_str(match ap.mode {
        wifi_mode::ADHOC => "[IBSS]",
        _ => "[ESS]",
    });
    caps
}

/// Converts a Wi-Fi mode code to a human-readable string.
///
/// Mode codes: 1 = Ad-hoc, 2 = Infrastructure, 3 = Access Point.
pub(crate) fn mode_to_string(m: u32) -> &'static str {
    match m {
        wifi_mode::ADHOC => "Adhoc",
        wifi_mode::INFRA => "Infra",
        wifi_mode::AP => "AP",
        _ => "Unknown",
    }
}

/// Decode SSID bytes for comparison purposes, defaulting to empty string if invalid.
pub(crate) fn decode_ssid_or_empty(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    str::from_utf8(bytes)
        .map(|s| s.to_string())
        .unwrap_or_else(|e| {
            warn!("Invalid UTF-8 in SSID during comparison: {e}");
            String::new()
        })
}

/// Rejects SSIDs that NetworkManager would refuse.
pub(crate) fn validate_ssid(ssid: &str) -> Result<()> {
    if ssid.is_empty() {
        return Err(ConnectionError::InvalidSsid("SSID is empty".into()));
    }
    if ssid.len() > MAX_SSID_BYTES {
        return Err(ConnectionError::InvalidSsid(format!(
            "SSID is {} bytes, maximum is {MAX_SSID_BYTES}",
            ssid.len()
        )));
    }
    Ok(())
}

/// Rejects WPA passphrases outside the 8-63 character range.
pub(crate) fn validate_security(creds: &WifiSecurity) -> Result<()> {
    if let WifiSecurity::WpaPsk { psk } = creds {
        let len = psk.chars().count();
        if !(8..=63).contains(&len) {
            return Err(ConnectionError::InvalidPassword(format!(
                "passphrase must be 8 to 63 characters, got {len}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(flags: u32, wpa_flags: u32, rsn_flags: u32) -> AccessPoint {
        AccessPoint {
            ssid: "Net".into(),
            bssid: "00:11:22:33:44:55".into(),
            frequency: 2412,
            strength: 50,
            flags,
            wpa_flags,
            rsn_flags,
            mode: wifi_mode::INFRA,
        }
    }

    #[test]
    fn test_channel_from_freq() {
        assert_eq!(channel_from_freq(2412), Some(1));
        assert_eq!(channel_from_freq(2437), Some(6));
        assert_eq!(channel_from_freq(2484), Some(14));
        assert_eq!(channel_from_freq(5180), Some(36));
        assert_eq!(channel_from_freq(5955), Some(1));
        assert_eq!(channel_from_freq(1000), None);
    }

    #[test]
    fn test_strength_to_rssi() {
        assert_eq!(strength_to_rssi(0), -100);
        assert_eq!(strength_to_rssi(80), -60);
        assert_eq!(strength_to_rssi(100), -50);
        assert_eq!(strength_to_rssi(255), -50);
    }

    #[test]
    fn test_capabilities_open() {
        assert_eq!(capabilities(&ap(0, 0, 0)), "[ESS]");
    }

    #[test]
    fn test_capabilities_wpa2_psk() {
        let caps = capabilities(&ap(
            1,
            0,
            security_flags::PSK | security_flags::PAIR_CCMP,
        ));
        assert_eq!(caps, "[WPA2-PSK-CCMP][ESS]");
    }

    #[test]
    fn test_capabilities_mixed_and_wep() {
        let caps = capabilities(&ap(
            1,
            security_flags::PSK | security_flags::PAIR_TKIP,
            security_flags::EAP,
        ));
        assert_eq!(caps, "[WPA-PSK-TKIP][WPA2-EAP][ESS]");
        assert_eq!(capabilities(&ap(security_flags::WEP, 0, 0)), "[WEP][ESS]");
    }

    #[test]
    fn test_mode_to_string() {
        assert_eq!(mode_to_string(1), "Adhoc");
        assert_eq!(mode_to_string(2), "Infra");
        assert_eq!(mode_to_string(3), "AP");
        assert_eq!(mode_to_string(99), "Unknown");
    }

    #[test]
    fn test_decode_ssid_or_empty() {
        assert_eq!(decode_ssid_or_empty(b"MyNetwork"), "MyNetwork");
        assert_eq!(decode_ssid_or_empty(b""), "");
        assert_eq!(decode_ssid_or_empty("café".as_bytes()), "café");
        assert_eq!(decode_ssid_or_empty(&[0xff, 0xfe]), "");
    }

    #[test]
    fn test_validate_ssid() {
        assert!(validate_ssid("MyNetwork").is_ok());
        assert!(validate_ssid("12345678901234567890123456789012").is_ok());
        assert!(matches!(
            validate_ssid(""),
            Err(ConnectionError::InvalidSsid(_))
        ));
        assert!(matches!(
            validate_ssid(&"a".repeat(33)),
            Err(ConnectionError::InvalidSsid(_))
        ));
    }

    #[test]
    fn test_validate_security() {
        assert!(validate_security(&WifiSecurity::Open).is_ok());
        assert!(
            validate_security(&WifiSecurity::WpaPsk {
                psk: "password".into()
            })
            .is_ok()
        );
        assert!(matches!(
            validate_security(&WifiSecurity::WpaPsk {
                psk: "short".into()
            }),
            Err(ConnectionError::InvalidPassword(_))
        ));
        assert!(matches!(
            validate_security(&WifiSecurity::WpaPsk { psk: "a".repeat(64) }),
            Err(ConnectionError::InvalidPassword(_))
        ));
    }
}
