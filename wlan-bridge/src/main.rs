use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = wlan_bridge::Args::parse();
    wlan_bridge::init_logging(args.verbose);
    wlan_bridge::run(args).await
}
