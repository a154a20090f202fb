//! The request/response envelope passed between the bridge and the plugin.
//!
//! A [`PluginCall`] carries the method name and its JSON arguments. It is
//! resolved or rejected exactly once: both consume the call. The bridge
//! keeps the paired [`CallHandle`] and awaits the outcome.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::models::PluginError;

/// JSON object used for call arguments and results.
pub type JsonObject = serde_json::Map<String, Value>;

/// Terminal outcome of a call.
pub type CallResult = std::result::Result<JsonObject, Rejection>;

/// Code reported when a call is dropped without being resolved.
const UNRESOLVED_CODE: &str = "UNRESOLVED";

/// Failure half of a call outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct Rejection {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<&PluginError> for Rejection {
    fn from(err: &PluginError) -> Self {
        Rejection::new(err.to_string()).with_code(err.code())
    }
}

/// A single invocation of a plugin method.
#[derive(Debug)]
pub struct PluginCall {
    id: String,
    method: String,
    data: JsonObject,
    responder: Option<oneshot::Sender<CallResult>>,
}

impl PluginCall {
    /// Creates a call and the handle its outcome is delivered to.
    pub fn new(method: impl Into<String>, data: JsonObject) -> (Self, CallHandle) {
        let (tx, rx) = oneshot::channel();
        let call = Self {
            id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            data,
            responder: Some(tx),
        };
        (call, CallHandle { rx })
    }

    /// Unique id of this call, used in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method_name(&self) -> &str {
        &self.method
    }

    pub fn data(&self) -> &JsonObject {
        &self.data
    }

    /// Whether `key` is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Argument `key`, treating JSON `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    /// Argument `key` if it is a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Resolves the call successfully.
    pub fn resolve(mut self, data: JsonObject) {
        debug!("Resolving call {} ({})", self.id, self.method);
        self.finish(Ok(data));
    }

    /// Resolves the call with a serializable result object.
    ///
    /// A value that does not serialize to a JSON object rejects the call
    /// instead, so the bridge always receives an object.
    pub fn resolve_with<T: Serialize>(self, value: &T) {
        match serde_json::to_value(value) {
            Ok(Value::Object(data)) => self.resolve(data),
            Ok(other) => {
                self.reject(format!("result is not an object: {other}"));
            }
            Err(e) => self.reject(format!("failed to serialize result: {e}")),
        }
    }

    /// Rejects the call with a message.
    pub fn reject(self, message: impl Into<String>) {
        self.reject_with(Rejection::new(message));
    }

    /// Rejects the call with the message and code of `err`.
    pub fn reject_error(self, err: &PluginError) {
        self.reject_with(Rejection::from(err));
    }

    pub fn reject_with(mut self, rejection: Rejection) {
        debug!(
            "Rejecting call {} ({}): {}",
            self.id, self.method, rejection.message
        );
        self.finish(Err(rejection));
    }

    fn finish(&mut self, result: CallResult) {
        if let Some(tx) = self.responder.take()
            && tx.send(result).is_err()
        {
            debug!("Bridge stopped waiting for call {}", self.id);
        }
    }
}

impl Drop for PluginCall {
    fn drop(&mut self) {
        if self.responder.is_some() {
            warn!(
                "Call {} ({}) dropped without being resolved",
                self.id, self.method
            );
        }
    }
}

/// The bridge's side of a call.
#[derive(Debug)]
pub struct CallHandle {
    rx: oneshot::Receiver<CallResult>,
}

impl CallHandle {
    /// Waits for the call to be resolved or rejected.
    ///
    /// A call dropped without resolution yields an `UNRESOLVED` rejection.
    pub async fn outcome(self) -> CallResult {
        self.rx.await.unwrap_or_else(|_| {
            Err(Rejection::new("call was dropped without being resolved").with_code(UNRESOLVED_CODE))
        })
    }

    /// Returns the outcome if the call has already settled.
    pub fn try_outcome(&mut self) -> Option<CallResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(Rejection::new(
                "call was dropped without being resolved",
            )
            .with_code(UNRESOLVED_CODE))),
        }
    }
}
