//! Runtime permission model.
//!
//! The host owns permission state; the plugin only reads it and asks the
//! host to prompt the user. A request completes when the user has answered
//! (or the host decided without asking), after which the plugin reads the
//! state again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::constants::bridge::{ACCESS_FINE_LOCATION, FINE_LOCATION_ALIAS};

/// Status of one permission alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet; the user has to be asked.
    Prompt,
}

impl Display for PermissionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// A named group of OS permission strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub alias: &'static str,
    pub strings: &'static [&'static str],
}

/// Location access, required by the platform to expose SSIDs, addresses
/// and scan results.
pub const FINE_LOCATION: Permission = Permission {
    alias: FINE_LOCATION_ALIAS,
    strings: &[ACCESS_FINE_LOCATION],
};

/// Every permission the plugin declares.
pub const DECLARED: &[Permission] = &[FINE_LOCATION];

/// State of each of `permissions` as `host` reports it, keyed by alias.
///
/// Only reads state, so it needs no Wi-Fi backend.
pub fn permission_states<H>(
    host: &H,
    permissions: &[Permission],
) -> BTreeMap<&'static str, PermissionState>
where
    H: PermissionHost + ?Sized,
{
    permissions
        .iter()
        .map(|p| (p.alias, host.permission_state(p)))
        .collect()
}

/// The host side of permission handling.
#[async_trait]
pub trait PermissionHost: Send + Sync {
    /// Current state of `permission`. Must not block.
    fn permission_state(&self, permission: &Permission) -> PermissionState;

    /// Asks for `permission` and returns once the request has been answered.
    ///
    /// There is no timeout: a prompt the user never answers never returns.
    async fn request_permission(&self, permission: &Permission);
}

/// Host for platforms that do not gate Wi-Fi introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

#[async_trait]
impl PermissionHost for AlwaysGranted {
    fn permission_state(&self, _permission: &Permission) -> PermissionState {
        PermissionState::Granted
    }

    async fn request_permission(&self, _permission: &Permission) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fine_location_alias() {
        assert_eq!(FINE_LOCATION.alias, "fineLocation");
        assert_eq!(
            FINE_LOCATION.strings,
            &["android.permission.ACCESS_FINE_LOCATION"]
        );
    }

    #[test]
    fn states_are_keyed_by_alias() {
        let states = permission_states(&AlwaysGranted, DECLARED);
        assert_eq!(states.len(), 1);
        assert_eq!(states.get("fineLocation"), Some(&PermissionState::Granted));
    }

    #[test]
    fn permission_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&PermissionState::Prompt).unwrap(),
            "\"prompt\""
        );
        let state: PermissionState = serde_json::from_str("\"granted\"").unwrap();
        assert_eq!(state, PermissionState::Granted);
        assert_eq!(PermissionState::Denied.to_string(), "denied");
    }
}
