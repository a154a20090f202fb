use std::sync::Arc;
use std::time::Duration;

use wlan::{
    AlwaysGranted, NetworkManagerBackend, PlatformWifiService, ScanSource, ScanSourceOptions,
    TimeoutConfig, WifiPlugin,
};

#[tokio::main]
async fn main() -> wlan::Result<()> {
    let config = TimeoutConfig::new().with_scan_wait(Duration::from_secs(2));
    let backend = NetworkManagerBackend::with_config(config).await?;
    let plugin = Arc::new(WifiPlugin::new(
        PlatformWifiService::new(backend),
        AlwaysGranted,
    ));

    let source = ScanSource::new(plugin, ScanSourceOptions::default());

    println!("Scanning for WiFi networks...");
    match source.pull().await {
        Ok(frame) => {
            for ap in frame.readings {
                println!(
                    "{:30} {:17} {:>4} dBm  ch {:<3} {}",
                    ap.ssid,
                    ap.bssid,
                    ap.rssi,
                    ap.channel.map(|c| c.to_string()).unwrap_or_default(),
                    ap.capabilities
                );
            }
        }
        Err(e) => eprintln!("Scan failed: {e}"),
    }

    Ok(())
}
