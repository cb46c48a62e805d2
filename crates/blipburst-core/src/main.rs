use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use blipburst_injector::{FaultInjector, SystemClock};
use blipburst_network::HttpCaller;
use clap::Parser;

mod cli;
mod config;
mod runner;

use cli::{Args, SettingsArgs};
use config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("BLIPBURST_LOG").unwrap_or_else(|_| "blipburst=info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "blipburst starting");

    match args.command {
        cli::Command::Run {
            settings,
            attempts,
            interval_ms,
        } => run(settings, attempts, interval_ms).await,
        cli::Command::Config { settings } => print_config(settings),
    }
}

async fn run(args: SettingsArgs, attempts: u32, interval_ms: u64) -> Result<()> {
    let settings = Settings::resolve(&args, chrono::Utc::now())?;
    let caller = HttpCaller::new(settings.http)?;
    let mut injector = FaultInjector::from_config(settings.injector, caller, SystemClock);

    let (start, end) = injector.window();
    tracing::info!(
        url = injector.url(),
        mode = %injector.mode(),
        %start,
        %end,
        attempts,
        "running attempts"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner::run_attempts(
        &mut injector,
        attempts,
        Duration::from_millis(interval_ms),
        &mut out,
    )
    .await?;
    out.flush()?;
    Ok(())
}

fn print_config(args: SettingsArgs) -> Result<()> {
    let settings = Settings::resolve(&args, chrono::Utc::now())?;
    print!("{}", settings.to_toml()?);
    Ok(())
}
