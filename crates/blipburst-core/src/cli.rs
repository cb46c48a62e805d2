use blipburst_injector::InjectorOptions;
use blipburst_network::CallerIdentity;
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "blipburst", version, about = "Fail outbound calls on a schedule to exercise error handling")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call the target repeatedly through the injector and report each outcome.
    Run {
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(long, default_value_t = 10)]
        attempts: u32,
        /// Pause between attempts.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Print the resolved configuration as TOML.
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Flags shared by every subcommand. Set flags override the config file.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct SettingsArgs {
    #[arg(long, env = "BLIPBURST_CONFIG")]
    pub config: Option<PathBuf>,
    /// Window start, RFC 3339.
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    /// Window end, RFC 3339.
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
    /// Errors per minute; 0 fails once immediately.
    #[arg(long, allow_negative_numbers = true)]
    pub frequency: Option<f64>,
    /// Rate-mode failure budget; zero or negative never fails.
    #[arg(long, allow_negative_numbers = true)]
    pub total: Option<i64>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub user_agent: Option<String>,
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl SettingsArgs {
    pub fn injector_overrides(&self) -> InjectorOptions {
        InjectorOptions {
            start: self.start,
            end: self.end,
            frequency: self.frequency,
            total: self.total,
            url: self.url.clone(),
        }
    }

    pub fn apply_http_overrides(&self, mut identity: CallerIdentity) -> CallerIdentity {
        if let Some(user_agent) = &self.user_agent {
            identity.user_agent = user_agent.clone();
        }
        if self.timeout_ms.is_some() {
            identity.timeout_ms = self.timeout_ms;
        }
        identity
    }
}
