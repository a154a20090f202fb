//! Connection state monitoring using D-Bus signals.
//!
//! Instead of polling device state in a loop, these functions subscribe to
//! the signals NetworkManager emits when state changes occur:
//!
//! - `NMDevice.StateChanged` - Emitted when device state changes
//! - `NMActiveConnection.StateChanged` - Emitted when connection activation state changes
//!
//! The current state is always checked first so a transition that happened
//! before the subscription is not missed.

use futures::StreamExt;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::timeout;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::constants::device_state;
use crate::models::{
    ActiveConnectionState, ConnectionError, ConnectionStateReason, connection_state_reason_to_error,
};
use crate::proxies::{NMActiveConnectionProxy, NMDeviceProxy};

/// Waits for an active connection to reach the activated state.
///
/// # Errors
///
/// Returns the mapped failure reason if the connection deactivates,
/// `Timeout` if `limit` expires first, or a D-Bus error.
pub(crate) async fn wait_for_connection_activation(
    conn: &Connection,
    active_conn_path: &OwnedObjectPath,
    limit: Duration,
) -> Result<()> {
    let active_conn = NMActiveConnectionProxy::builder(conn)
        .path(active_conn_path.clone())?
        .build()
        .await?;

    let mut stream = active_conn.receive_activation_state_changed().await?;
    debug!("Subscribed to ActiveConnection StateChanged signal");

    let state = ActiveConnectionState::from(active_conn.state().await?);
    debug!("Current active connection state: {state}");

    match state {
        ActiveConnectionState::Activated => {
            debug!("Connection already activated");
            return Ok(());
        }
        ActiveConnectionState::Deactivated => {
            warn!("Connection already deactivated");
            return Err(ConnectionError::ConnectionFailed(
                ConnectionStateReason::Unknown,
            ));
        }
        _ => {}
    }

    let result = timeout(limit, async {
        while let Some(signal) = stream.next().await {
            match signal.args() {
                Ok(args) => {
                    let new_state = ActiveConnectionState::from(args.state);
                    let reason = ConnectionStateReason::from(args.reason);
                    debug!("Active connection state changed to: {new_state} (reason: {reason})");

                    match new_state {
                        ActiveConnectionState::Activated => return Ok(()),
                        ActiveConnectionState::Deactivated => {
                            return Err(connection_state_reason_to_error(args.reason));
                        }
                        _ => {}
                    }
                }
                Err(e) => warn!("Failed to parse StateChanged signal args: {e}"),
            }
        }
        Err(ConnectionError::Stuck("signal stream ended".into()))
    })
    .await;

    match result {
        Ok(inner) => inner,
        Err(_) => {
            warn!("Connection activation timed out after {limit:?}");
            Err(ConnectionError::Timeout)
        }
    }
}

fn is_disconnected(state: u32) -> bool {
    state == device_state::DISCONNECTED || state == device_state::UNAVAILABLE
}

/// Waits for a device to reach the disconnected state.
///
/// A device that is still not disconnected when `limit` expires yields
/// `Stuck` with the last observed state.
pub(crate) async fn wait_for_device_disconnect(
    dev: &NMDeviceProxy<'_>,
    limit: Duration,
) -> Result<()> {
    let mut stream = dev.receive_device_state_changed().await?;

    let current_state = dev.state().await?;
    debug!("Current device state for disconnect: {current_state}");
    if is_disconnected(current_state) {
        return Ok(());
    }

    let result = timeout(limit, async {
        while let Some(signal) = stream.next().await {
            match signal.args() {
                Ok(args) => {
                    debug!("Device state during disconnect: {}", args.new_state);
                    if is_disconnected(args.new_state) {
                        return Ok(());
                    }
                }
                Err(e) => warn!("Failed to parse StateChanged signal args: {e}"),
            }
        }
        Err(ConnectionError::Stuck("signal stream ended".into()))
    })
    .await;

    match result {
        Ok(inner) => inner,
        Err(_) => {
            let final_state = dev.state().await?;
            if is_disconnected(final_state) {
                Ok(())
            } else {
                warn!("Disconnect timed out, device still in state: {final_state}");
                Err(ConnectionError::Stuck(format!("state {final_state}")))
            }
        }
    }
}
