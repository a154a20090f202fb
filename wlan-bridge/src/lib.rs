//! Command line host for the `wlan` plugin.
//!
//! Each subcommand becomes one plugin call. Resolved calls are printed as
//! JSON on stdout; rejections go to stderr and make the process exit with
//! status 1. Permission prompts are answered on the terminal and remembered
//! in the user's config directory.

pub mod config;
pub mod file_lock;
pub mod permission_store;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};
use tokio::sync::mpsc;
use wlan::{
    DECLARED, JsonObject, NetworkManagerBackend, Operation, PermissionHost, PlatformWifiService,
    PluginCall, ScanFrame, ScanSource, ScanSourceOptions, WifiPlugin, WifiService, args,
    permission_states,
};

use crate::config::BridgeConfig;
use crate::permission_store::{FilePermissionHost, TerminalPrompt};

#[derive(Parser, Debug)]
#[command(name = "wlan-bridge")]
#[command(version, about = "Run wlan plugin calls from the command line")]
pub struct Args {
    /// Config file to use instead of the one in the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a value through the plugin and print it back
    Echo { value: String },
    /// Print the current IPv4 address
    GetIp,
    /// Print the SSID of the current network
    GetSsid,
    /// Join a network by SSID
    Connect {
        ssid: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Join the strongest network whose SSID starts with a prefix
    ConnectPrefix {
        prefix: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Leave the current network
    Disconnect,
    /// List visible access points
    Scan,
    /// Scan repeatedly and print one JSON line per scan
    Watch {
        /// Pause between scans; defaults to the configured interval.
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many scans.
        #[arg(long)]
        count: Option<usize>,
    },
    /// Show or forget stored permission answers
    Permissions {
        #[arg(value_enum, default_value_t = PermissionAction::Check)]
        action: PermissionAction,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    Check,
    Reset,
}

impl Command {
    /// The plugin call a one-shot command translates to.
    pub fn to_call(&self) -> Option<(Operation, JsonObject)> {
        let mut data = JsonObject::new();
        let op = match self {
            Self::Echo { value } => {
                data.insert(args::VALUE.into(), Value::from(value.as_str()));
                Operation::Echo
            }
            Self::GetIp => Operation::GetIp,
            Self::GetSsid => Operation::GetSsid,
            Self::Connect { ssid, password } => {
                insert_credentials(&mut data, ssid, password.as_deref());
                Operation::Connect
            }
            Self::ConnectPrefix { prefix, password } => {
                insert_credentials(&mut data, prefix, password.as_deref());
                Operation::ConnectPrefix
            }
            Self::Disconnect => Operation::Disconnect,
            Self::Scan => Operation::Scan,
            Self::Watch { .. } | Self::Permissions { .. } => return None,
        };
        Some((op, data))
    }
}

fn insert_credentials(data: &mut JsonObject, ssid: &str, password: Option<&str>) {
    data.insert(args::SSID.into(), Value::from(ssid));
    if let Some(password) = password {
        data.insert(args::PASSWORD.into(), Value::from(password));
    }
}

/// Installs `env_logger`; `RUST_LOG` still wins when set.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

pub async fn run(args: Args) -> Result<ExitCode> {
    let config = BridgeConfig::load(args.config.as_deref())?;
    let host = FilePermissionHost::open_default(TerminalPrompt)?;

    if let Command::Permissions { action } = &args.command {
        match action {
            PermissionAction::Check => println!("{}", permission_report(&host)?),
            PermissionAction::Reset => {
                host.reset()?;
                println!("Cleared {}", host.path().display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let backend = NetworkManagerBackend::with_config(config.timeout_config())
        .await
        .context("Failed to connect to NetworkManager")?;
    let plugin = Arc::new(WifiPlugin::new(PlatformWifiService::new(backend), host));

    if let Some((op, data)) = args.command.to_call() {
        return invoke(&plugin, op, data).await;
    }

    match args.command {
        Command::Watch { interval_ms, count } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.watch_interval());
            watch(plugin, interval, count).await
        }
        one_shot => anyhow::bail!("{one_shot:?} was not dispatched"),
    }
}

/// Pretty JSON of every declared permission's state.
pub fn permission_report<H: PermissionHost>(host: &H) -> Result<String> {
    let states = permission_states(host, DECLARED);
    Ok(serde_json::to_string_pretty(&states)?)
}

/// Runs one call and prints its outcome.
pub async fn invoke<S, H>(
    plugin: &WifiPlugin<S, H>,
    op: Operation,
    data: JsonObject,
) -> Result<ExitCode>
where
    S: WifiService,
    H: PermissionHost,
{
    let (call, handle) = PluginCall::new(op.as_str(), data);
    plugin.handle(call).await;

    match handle.outcome().await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&Value::Object(result))?);
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            eprintln!("{}", serde_json::to_string_pretty(&rejection)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn watch<S, H>(
    plugin: Arc<WifiPlugin<S, H>>,
    interval: Duration,
    count: Option<usize>,
) -> Result<ExitCode>
where
    S: WifiService + 'static,
    H: PermissionHost + 'static,
{
    let mut source = ScanSource::new(
        plugin,
        ScanSourceOptions {
            interval,
            ..ScanSourceOptions::default()
        },
    );
    let (tx, mut rx) = mpsc::channel(8);
    source.start(tx);

    let mut printed = 0;
    while let Some(frame) = rx.recv().await {
        println!("{}", serde_json::to_string(&frame_to_json(&frame))?);
        printed += 1;
        if count.is_some_and(|limit| printed >= limit) {
            break;
        }
    }

    source.stop().await;
    Ok(ExitCode::SUCCESS)
}

/// JSON line printed by `watch` for one frame.
pub fn frame_to_json(frame: &ScanFrame) -> Value {
    let timestamp = frame
        .timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let readings: Vec<Value> = frame
        .readings
        .iter()
        .map(|r| {
            json!({
                "bssid": r.bssid,
                "ssid": r.ssid,
                "frequency": r.frequency,
                "channel": r.channel,
                "capabilities": r.capabilities,
                "rssi": r.rssi,
            })
        })
        .collect();

    json!({
        "source": frame.source,
        "timestamp": timestamp,
        "readings": readings,
    })
}
