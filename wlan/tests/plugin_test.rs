//! Dispatch and permission gating of the plugin entry point.
//!
//! These tests drive `WifiPlugin` with a recording service and a scripted
//! permission host, so no D-Bus or real prompt is involved.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use wlan::{
    CallHandle, JsonObject, Operation, Permission, PermissionHost, PermissionState, PluginCall,
    WifiPlugin, WifiService,
};

/// Records which service methods ran and resolves every call.
#[derive(Default)]
struct RecordingService {
    invoked: Mutex<Vec<&'static str>>,
}

impl RecordingService {
    fn record(&self, name: &'static str, call: PluginCall) {
        self.invoked.lock().unwrap().push(name);
        let mut data = JsonObject::new();
        data.insert("handledBy".into(), Value::from(name));
        call.resolve(data);
    }

    fn invoked(&self) -> Vec<&'static str> {
        self.invoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl WifiService for RecordingService {
    async fn get_ip(&self, call: PluginCall) {
        self.record("getIP", call);
    }
    async fn get_ssid(&self, call: PluginCall) {
        self.record("getSSID", call);
    }
    async fn connect(&self, call: PluginCall) {
        self.record("connect", call);
    }
    async fn connect_prefix(&self, call: PluginCall) {
        self.record("connectPrefix", call);
    }
    async fn disconnect(&self, call: PluginCall) {
        self.record("disconnect", call);
    }
    async fn scan(&self, call: PluginCall) {
        self.record("scan", call);
    }
}

/// Permission host with a fixed initial state and a scripted answer.
struct ScriptedHost {
    state: Mutex<PermissionState>,
    answer: PermissionState,
    queries: AtomicUsize,
    requests: AtomicUsize,
    /// When set, requests block until notified.
    gate: Option<Arc<Notify>>,
}

impl ScriptedHost {
    fn new(initial: PermissionState, answer: PermissionState) -> Self {
        Self {
            state: Mutex::new(initial),
            answer,
            queries: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn granted() -> Self {
        Self::new(PermissionState::Granted, PermissionState::Granted)
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionHost for ScriptedHost {
    fn permission_state(&self, permission: &Permission) -> PermissionState {
        assert_eq!(permission.alias, "fineLocation");
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap()
    }

    async fn request_permission(&self, _permission: &Permission) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        *self.state.lock().unwrap() = self.answer;
    }
}

const GATED: [Operation; 5] = [
    Operation::GetIp,
    Operation::GetSsid,
    Operation::Connect,
    Operation::ConnectPrefix,
    Operation::Scan,
];

fn call(method: &str, data: Value) -> (PluginCall, CallHandle) {
    PluginCall::new(method, data.as_object().cloned().unwrap_or_default())
}

/// Arguments that satisfy every operation's validation.
fn valid_call(op: Operation) -> (PluginCall, CallHandle) {
    call(op.as_str(), json!({ "ssid": "HomeNet" }))
}

#[tokio::test]
async fn ssid_is_required_before_anything_else() {
    for op in [Operation::Connect, Operation::ConnectPrefix] {
        let plugin = WifiPlugin::new(
            RecordingService::default(),
            ScriptedHost::new(PermissionState::Prompt, PermissionState::Granted),
        );
        let (c, handle) = call(op.as_str(), json!({ "password": "password123" }));
        plugin.handle(c).await;

        let err = handle.outcome().await.unwrap_err();
        assert_eq!(err.message, "Must provide an ssid");
        assert_eq!(plugin.permission_host().queries(), 0, "{op}");
        assert_eq!(plugin.permission_host().requests(), 0, "{op}");
        assert!(plugin.service().invoked().is_empty(), "{op}");
    }
}

#[tokio::test]
async fn null_ssid_counts_as_missing() {
    let plugin = WifiPlugin::new(RecordingService::default(), ScriptedHost::granted());
    let (c, handle) = call("connect", json!({ "ssid": null }));
    plugin.handle(c).await;
    assert_eq!(
        handle.outcome().await.unwrap_err().message,
        "Must provide an ssid"
    );
}

#[tokio::test]
async fn granted_permission_forwards_once() {
    for op in GATED {
        let plugin = WifiPlugin::new(RecordingService::default(), ScriptedHost::granted());
        let (c, handle) = valid_call(op);
        plugin.handle(c).await;

        let data = handle.outcome().await.unwrap();
        assert_eq!(data["handledBy"], op.as_str());
        assert_eq!(plugin.service().invoked(), vec![op.as_str()]);
        assert_eq!(plugin.permission_host().queries(), 1, "{op}");
        assert_eq!(plugin.permission_host().requests(), 0, "{op}");
    }
}

#[tokio::test]
async fn missing_permission_is_requested_once_then_resumes_same_operation() {
    for initial in [PermissionState::Prompt, PermissionState::Denied] {
        for op in GATED {
            let plugin = WifiPlugin::new(
                RecordingService::default(),
                ScriptedHost::new(initial, PermissionState::Granted),
            );
            let (c, handle) = valid_call(op);
            plugin.handle(c).await;

            let data = handle.outcome().await.unwrap();
            assert_eq!(data["handledBy"], op.as_str());
            assert_eq!(plugin.permission_host().requests(), 1, "{op}");
            assert_eq!(plugin.service().invoked(), vec![op.as_str()]);
        }
    }
}

#[tokio::test]
async fn denied_permission_rejects_without_touching_service() {
    for answer in [PermissionState::Denied, PermissionState::Prompt] {
        for op in GATED {
            let plugin = WifiPlugin::new(
                RecordingService::default(),
                ScriptedHost::new(PermissionState::Prompt, answer),
            );
            let (c, handle) = valid_call(op);
            plugin.handle(c).await;

            let err = handle.outcome().await.unwrap_err();
            assert_eq!(err.message, "User denied permission");
            assert_eq!(err.code.as_deref(), Some("PERMISSION_DENIED"));
            assert_eq!(plugin.permission_host().requests(), 1);
            assert!(plugin.service().invoked().is_empty(), "{op}");
        }
    }
}

#[tokio::test]
async fn call_stays_pending_until_the_prompt_is_answered() {
    let gate = Arc::new(Notify::new());
    let mut host = ScriptedHost::new(PermissionState::Prompt, PermissionState::Granted);
    host.gate = Some(Arc::clone(&gate));
    let plugin = Arc::new(WifiPlugin::new(RecordingService::default(), host));

    let (c, mut handle) = call("getSSID", json!({}));
    let task = tokio::spawn({
        let plugin = Arc::clone(&plugin);
        async move { plugin.handle(c).await }
    });

    while plugin.permission_host().requests() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(handle.try_outcome().is_none());
    assert!(plugin.service().invoked().is_empty());

    gate.notify_one();
    task.await.unwrap();
    assert_eq!(handle.outcome().await.unwrap()["handledBy"], "getSSID");
}

#[tokio::test]
async fn echo_returns_value_regardless_of_permission() {
    for state in [
        PermissionState::Granted,
        PermissionState::Denied,
        PermissionState::Prompt,
    ] {
        let plugin = WifiPlugin::new(
            RecordingService::default(),
            ScriptedHost::new(state, PermissionState::Denied),
        );
        let (c, handle) = call("echo", json!({ "value": "x" }));
        plugin.handle(c).await;

        assert_eq!(handle.outcome().await.unwrap()["value"], "x");
        assert_eq!(plugin.permission_host().queries(), 0);
        assert!(plugin.service().invoked().is_empty());
    }
}

#[tokio::test]
async fn echo_without_value_returns_null() {
    let plugin = WifiPlugin::new(RecordingService::default(), ScriptedHost::granted());
    let (c, handle) = call("echo", json!({}));
    plugin.handle(c).await;
    assert_eq!(handle.outcome().await.unwrap()["value"], Value::Null);
}

#[tokio::test]
async fn disconnect_never_consults_permissions() {
    let plugin = WifiPlugin::new(
        RecordingService::default(),
        ScriptedHost::new(PermissionState::Denied, PermissionState::Denied),
    );
    let (c, handle) = call("disconnect", json!({}));
    plugin.handle(c).await;

    assert_eq!(handle.outcome().await.unwrap()["handledBy"], "disconnect");
    assert_eq!(plugin.permission_host().queries(), 0);
    assert_eq!(plugin.permission_host().requests(), 0);
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let plugin = WifiPlugin::new(RecordingService::default(), ScriptedHost::granted());
    let (c, handle) = call("toggleAirplaneMode", json!({}));
    plugin.handle(c).await;

    let err = handle.outcome().await.unwrap_err();
    assert_eq!(err.message, "Method not implemented: toggleAirplaneMode");
    assert_eq!(err.code.as_deref(), Some("UNIMPLEMENTED"));
    assert!(plugin.service().invoked().is_empty());
}

#[tokio::test]
async fn permission_helpers_report_and_request() {
    let plugin = WifiPlugin::new(
        RecordingService::default(),
        ScriptedHost::new(PermissionState::Prompt, PermissionState::Granted),
    );
    assert_eq!(
        plugin.check_permissions().get("fineLocation"),
        Some(&PermissionState::Prompt)
    );

    let states = plugin.request_permissions().await;
    assert_eq!(states.get("fineLocation"), Some(&PermissionState::Granted));
    assert_eq!(plugin.permission_host().requests(), 1);

    plugin.request_permissions().await;
    assert_eq!(plugin.permission_host().requests(), 1);
}

#[test]
fn plugin_declares_name_and_permission() {
    assert_eq!(WifiPlugin::<RecordingService, ScriptedHost>::NAME, "wifi");
    let declared = WifiPlugin::<RecordingService, ScriptedHost>::PERMISSIONS;
    assert_eq!(declared.len(), 1);
    assert_eq!(declared[0].alias, "fineLocation");
    assert_eq!(
        declared[0].strings,
        &["android.permission.ACCESS_FINE_LOCATION"]
    );
}
