use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::models::PluginError;
use crate::permission::{FINE_LOCATION, Permission};

/// The methods the plugin exposes to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Echo,
    GetIp,
    GetSsid,
    Connect,
    ConnectPrefix,
    Disconnect,
    Scan,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Echo,
        Operation::GetIp,
        Operation::GetSsid,
        Operation::Connect,
        Operation::ConnectPrefix,
        Operation::Disconnect,
        Operation::Scan,
    ];

    /// Method name used by the bridge.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Echo => "echo",
            Operation::GetIp => "getIP",
            Operation::GetSsid => "getSSID",
            Operation::Connect => "connect",
            Operation::ConnectPrefix => "connectPrefix",
            Operation::Disconnect => "disconnect",
            Operation::Scan => "scan",
        }
    }

    /// Whether the call must carry an `ssid` argument.
    pub fn requires_ssid(&self) -> bool {
        matches!(self, Operation::Connect | Operation::ConnectPrefix)
    }

    /// Permission that must be granted before the platform is touched.
    pub fn permission(&self) -> Option<&'static Permission> {
        match self {
            Operation::GetIp
            | Operation::GetSsid
            | Operation::Connect
            | Operation::ConnectPrefix
            | Operation::Scan => Some(&FINE_LOCATION),
            Operation::Echo | Operation::Disconnect => None,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| PluginError::Unimplemented(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn method_names_are_case_sensitive() {
        assert!(matches!(
            "getIp".parse::<Operation>(),
            Err(PluginError::Unimplemented(name)) if name == "getIp"
        ));
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn gating_table() {
        let gated: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.permission().is_some())
            .collect();
        assert_eq!(
            gated,
            vec![
                Operation::GetIp,
                Operation::GetSsid,
                Operation::Connect,
                Operation::ConnectPrefix,
                Operation::Scan,
            ]
        );
        assert!(Operation::Connect.requires_ssid());
        assert!(Operation::ConnectPrefix.requires_ssid());
        assert!(!Operation::Scan.requires_ssid());
    }
}
