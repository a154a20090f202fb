//! NetworkManager connection settings builder.
//!
//! Constructs the D-Bus settings dictionaries required by NetworkManager's
//! `AddAndActivateConnection` method.
//!
//! # NetworkManager Settings Structure
//!
//! A connection is represented as a nested dictionary:
//! - `connection`: General settings (type, id, uuid, autoconnect)
//! - `802-11-wireless`: Wi-Fi specific settings (ssid, mode, security reference)
//! - `802-11-wireless-security`: Security settings (key-mgmt, psk, auth-alg)
//! - `ipv4` / `ipv6`: IP configuration ("auto" for DHCP)

use std::collections::HashMap;
use zvariant::Value;

use crate::models::WifiSecurity;

pub(crate) type ConnectionSettings =
    HashMap<&'static str, HashMap<&'static str, Value<'static>>>;

fn string_array(xs: &[&str]) -> Value<'static> {
    let vals: Vec<String> = xs.iter().map(|s| s.to_string()).collect();
    Value::from(vals)
}

fn base_wifi_section(ssid: &str) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("ssid", Value::from(ssid.as_bytes().to_vec()));
    s.insert("mode", Value::from("infrastructure"));
    s
}

fn base_connection_section(ssid: &str, autoconnect: bool) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("type", Value::from("802-11-wireless"));
    s.insert("id", Value::from(ssid.to_string()));
    s.insert("uuid", Value::from(uuid::Uuid::new_v4().to_string()));
    s.insert("autoconnect", Value::from(autoconnect));
    s
}

/// Uses RSN with CCMP. `psk-flags` of 0 stores the password in the profile.
fn build_psk_security(psk: &str) -> HashMap<&'static str, Value<'static>> {
    let mut sec = HashMap::new();

    sec.insert("key-mgmt", Value::from("wpa-psk"));
    sec.insert("psk", Value::from(psk.to_string()));
    sec.insert("psk-flags", Value::from(0u32));
    sec.insert("auth-alg", Value::from("open"));
    sec.insert("proto", string_array(&["rsn"]));
    sec.insert("pairwise", string_array(&["ccmp"]));
    sec.insert("group", string_array(&["ccmp"]));

    sec
}

fn auto_ip_section() -> HashMap<&'static str, Value<'static>> {
    let mut ip = HashMap::new();
    ip.insert("method", Value::from("auto"));
    ip
}

/// Builds the full settings dictionary for a Wi-Fi connection.
pub(crate) fn build_wifi_connection(
    ssid: &str,
    security: &WifiSecurity,
    autoconnect: bool,
) -> ConnectionSettings {
    let mut conn: ConnectionSettings = HashMap::new();

    conn.insert("connection", base_connection_section(ssid, autoconnect));
    let mut wifi = base_wifi_section(ssid);

    match security {
        WifiSecurity::Open => {}
        WifiSecurity::WpaPsk { psk } => {
            wifi.insert("security", Value::from("802-11-wireless-security"));
            conn.insert("802-11-wireless-security", build_psk_security(psk));
        }
    }

    conn.insert("802-11-wireless", wifi);
    conn.insert("ipv4", auto_ip_section());
    conn.insert("ipv6", auto_ip_section());

    conn
}
