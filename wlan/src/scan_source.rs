//! Periodic Wi-Fi scanning.
//!
//! [`ScanSource`] calls the plugin's `scan` operation on an interval and
//! turns each successful result into a [`ScanFrame`] of access point
//! readings. Scans are sequential: the next one is scheduled only after the
//! previous one finished.

use log::{debug, error, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::call::{JsonObject, PluginCall, Rejection};
use crate::models::{ScanEntry, ScanResult};
use crate::operation::Operation;
use crate::permission::PermissionHost;
use crate::plugin::WifiPlugin;
use crate::service::WifiService;
use crate::utils::channel_from_freq;

/// Signal reading for one access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointReading {
    pub bssid: String,
    /// Display name; empty for hidden networks.
    pub ssid: String,
    pub frequency: u32,
    pub channel: Option<u16>,
    pub capabilities: String,
    /// RSSI in dBm.
    pub rssi: i32,
}

impl From<ScanEntry> for AccessPointReading {
    fn from(entry: ScanEntry) -> Self {
        Self {
            channel: channel_from_freq(entry.frequency),
            bssid: entry.bssid,
            ssid: entry.ssid,
            frequency: entry.frequency,
            capabilities: entry.capabilities,
            rssi: entry.signal_level,
        }
    }
}

/// The readings of one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFrame {
    /// Identifier of the receiver that produced the frame.
    pub source: String,
    pub timestamp: SystemTime,
    pub readings: Vec<AccessPointReading>,
}

#[derive(Debug, Error)]
pub enum ScanSourceError {
    /// The plugin rejected the scan call.
    #[error("scan rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The scan resolved but reported that it did not succeed.
    #[error("Wi-Fi scan did not succeed")]
    ScanFailed,

    /// The scan result did not have the expected shape.
    #[error("malformed scan result: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ScanSourceOptions {
    /// Delay between the end of one scan and the start of the next.
    pub interval: Duration,
    /// Identifier stamped on every frame.
    pub source: String,
}

impl Default for ScanSourceOptions {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            source: "wlan".to_string(),
        }
    }
}

/// Drives periodic scans through a [`WifiPlugin`].
pub struct ScanSource<S, H> {
    plugin: Arc<WifiPlugin<S, H>>,
    options: ScanSourceOptions,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<S, H> ScanSource<S, H>
where
    S: WifiService + 'static,
    H: PermissionHost + 'static,
{
    pub fn new(plugin: Arc<WifiPlugin<S, H>>, options: ScanSourceOptions) -> Self {
        Self {
            plugin,
            options,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn options(&self) -> &ScanSourceOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Performs one scan and returns its frame.
    pub async fn pull(&self) -> Result<ScanFrame, ScanSourceError> {
        scan_once(&self.plugin, &self.options.source).await
    }

    /// Starts scanning in the background, sending frames to `frames`.
    ///
    /// The loop ends on [`stop`](Self::stop), when the source is dropped
    /// or when the receiver is dropped. Starting an already running source does nothing.
    pub fn start(&mut self, frames: mpsc::Sender<ScanFrame>) {
        if self.is_running() {
            warn!("Scan source '{}' already running", self.options.source);
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let plugin = Arc::clone(&self.plugin);
        let options = self.options.clone();

        self.task = Some(tokio::spawn(async move {
            debug!(
                "Scan source '{}' started, interval {:?}",
                options.source, options.interval
            );
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(options.interval) => {}
                }

                let outcome = tokio::select! {
                    _ = cancel.cancelled() => break,
                    outcome = scan_once(&plugin, &options.source) => outcome,
                };

                match outcome {
                    Ok(frame) => {
                        if frames.send(frame).await.is_err() {
                            debug!("Frame receiver dropped, stopping scan source");
                            break;
                        }
                    }
                    Err(e) => error!("Unable to perform Wi-Fi scan: {e}"),
                }
            }
            debug!("Scan source '{}' stopped", options.source);
        }));
    }

    /// Stops the background loop and waits for it to finish.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Scan task ended abnormally: {e}");
        }
    }
}

impl<S, H> Drop for ScanSource<S, H> {
    // Cancels without waiting for the task to exit.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn scan_once<S, H>(
    plugin: &WifiPlugin<S, H>,
    source: &str,
) -> Result<ScanFrame, ScanSourceError>
where
    S: WifiService,
    H: PermissionHost,
{
    let (call, handle) = PluginCall::new(Operation::Scan.as_str(), JsonObject::new());
    plugin.handle(call).await;
    let data = handle.outcome().await?;

    let result: ScanResult = serde_json::from_value(Value::Object(data))?;
    if !result.start_scan_success || !result.scan_success {
        return Err(ScanSourceError::ScanFailed);
    }

    Ok(ScanFrame {
        source: source.to_string(),
        timestamp: SystemTime::now(),
        readings: result
            .scan_result
            .into_iter()
            .map(AccessPointReading::from)
            .collect(),
    })
}
