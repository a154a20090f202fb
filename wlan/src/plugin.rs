use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::call::PluginCall;
use crate::constants::{args, bridge};
use crate::models::{EchoResult, PluginError};
use crate::operation::Operation;
use crate::permission::{
    DECLARED, Permission, PermissionHost, PermissionState, permission_states,
};
use crate::service::WifiService;

/// Entry point the bridge dispatches Wi-Fi calls to.
///
/// Checks the location permission before any operation that exposes
/// network details, asks the host for it when missing, and forwards the
/// call to the [`WifiService`] once it is granted.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use wlan::{AlwaysGranted, NetworkManagerBackend, PlatformWifiService, PluginCall, WifiPlugin};
///
/// # async fn example() -> wlan::Result<()> {
/// let backend = NetworkManagerBackend::new().await?;
/// let plugin = WifiPlugin::new(PlatformWifiService::new(backend), AlwaysGranted);
///
/// let args = json!({ "ssid": "HomeNet", "password": "password123" });
/// let (call, handle) = PluginCall::new("connect", args.as_object().cloned().unwrap_or_default());
/// plugin.handle(call).await;
/// println!("{:?}", handle.outcome().await);
/// # Ok(())
/// # }
/// ```
pub struct WifiPlugin<S, H> {
    service: S,
    permissions: H,
}

impl<S: WifiService, H: PermissionHost> WifiPlugin<S, H> {
    /// Name the plugin is registered under with the bridge.
    pub const NAME: &'static str = bridge::PLUGIN_NAME;

    /// Permissions the plugin declares.
    pub const PERMISSIONS: &'static [Permission] = DECLARED;

    pub fn new(service: S, permissions: H) -> Self {
        Self {
            service,
            permissions,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn permission_host(&self) -> &H {
        &self.permissions
    }

    /// Dispatches a call by its method name.
    ///
    /// Unknown methods are rejected with `UNIMPLEMENTED`. The returned future
    /// completes once the call has been handed off; for gated operations
    /// without permission that includes waiting for the user's answer.
    pub async fn handle(&self, call: PluginCall) {
        match call.method_name().parse::<Operation>() {
            Ok(op) => self.dispatch(op, call).await,
            Err(e) => {
                warn!("Rejecting call {}: {e}", call.id());
                call.reject_error(&e);
            }
        }
    }

    /// Runs `op` for `call`, applying argument and permission checks.
    pub async fn dispatch(&self, op: Operation, call: PluginCall) {
        debug!("Dispatching {op} (call {})", call.id());
        match op {
            Operation::Echo => self.echo(call),
            Operation::GetIp => self.get_ip(call).await,
            Operation::GetSsid => self.get_ssid(call).await,
            Operation::Connect => self.connect(call).await,
            Operation::ConnectPrefix => self.connect_prefix(call).await,
            Operation::Disconnect => self.disconnect(call).await,
            Operation::Scan => self.scan(call).await,
        }
    }

    /// Returns the `value` argument unchanged. Never touches permissions.
    pub fn echo(&self, call: PluginCall) {
        let value = call.data().get(args::VALUE).cloned().unwrap_or_default();
        call.resolve_with(&EchoResult { value });
    }

    pub async fn get_ip(&self, call: PluginCall) {
        self.gated(Operation::GetIp, call).await;
    }

    pub async fn get_ssid(&self, call: PluginCall) {
        self.gated(Operation::GetSsid, call).await;
    }

    pub async fn connect(&self, call: PluginCall) {
        self.gated(Operation::Connect, call).await;
    }

    pub async fn connect_prefix(&self, call: PluginCall) {
        self.gated(Operation::ConnectPrefix, call).await;
    }

    /// Forwards unconditionally; disconnecting reveals nothing.
    pub async fn disconnect(&self, call: PluginCall) {
        self.service.disconnect(call).await;
    }

    pub async fn scan(&self, call: PluginCall) {
        self.gated(Operation::Scan, call).await;
    }

    /// Current state of every declared permission, keyed by alias.
    pub fn check_permissions(&self) -> BTreeMap<&'static str, PermissionState> {
        permission_states(&self.permissions, Self::PERMISSIONS)
    }

    /// Requests every declared permission that is not granted yet and
    /// returns the resulting states.
    pub async fn request_permissions(&self) -> BTreeMap<&'static str, PermissionState> {
        for permission in Self::PERMISSIONS {
            if self.permissions.permission_state(permission) != PermissionState::Granted {
                self.permissions.request_permission(permission).await;
            }
        }
        self.check_permissions()
    }

    /// Validates arguments, then runs `op` once its permission is granted.
    async fn gated(&self, op: Operation, call: PluginCall) {
        if op.requires_ssid() && !call.has(args::SSID) {
            call.reject_error(&PluginError::MissingSsid);
            return;
        }

        let Some(permission) = op.permission() else {
            self.forward(op, call).await;
            return;
        };

        if self.permissions.permission_state(permission) == PermissionState::Granted {
            self.forward(op, call).await;
            return;
        }

        info!(
            "Requesting '{}' for {op} (call {})",
            permission.alias,
            call.id()
        );
        self.permissions.request_permission(permission).await;
        self.on_permission_result(op, permission, call).await;
    }

    /// Continuation of a permission request raised by `op`.
    async fn on_permission_result(&self, op: Operation, permission: &Permission, call: PluginCall) {
        match self.permissions.permission_state(permission) {
            PermissionState::Granted => {
                debug!("'{}' granted, resuming {op}", permission.alias);
                self.forward(op, call).await;
            }
            state => {
                info!("'{}' is {state}, rejecting {op}", permission.alias);
                call.reject_error(&PluginError::PermissionDenied);
            }
        }
    }

    /// Hands the call to the service method matching `op`.
    async fn forward(&self, op: Operation, call: PluginCall) {
        match op {
            Operation::Echo => self.echo(call),
            Operation::GetIp => self.service.get_ip(call).await,
            Operation::GetSsid => self.service.get_ssid(call).await,
            Operation::Connect => self.service.connect(call).await,
            Operation::ConnectPrefix => self.service.connect_prefix(call).await,
            Operation::Disconnect => self.service.disconnect(call).await,
            Operation::Scan => self.service.scan(call).await,
        }
    }
}
