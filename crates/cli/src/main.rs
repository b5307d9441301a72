mod channel_commands;
mod config_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use nestor_config::{LogConfig, NestorConfig};

#[derive(Parser)]
#[command(name = "nestor", about = "Nestor — personal assistant message gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Overrides the config.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "NESTOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message through a channel.
    Send {
        /// Channel to use (telegram, email).
        #[arg(long)]
        channel: String,
        /// Recipient (chat ID, @username, or email address).
        #[arg(long)]
        to: String,
        /// Message body.
        #[arg(short, long)]
        message: String,
        /// Subject line (email only).
        #[arg(long)]
        subject: Option<String>,
    },
    /// Show the state of every configured channel.
    Status,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli, log: &LogConfig) {
    let level = cli.log_level.as_deref().unwrap_or(&log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs || log.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<NestorConfig> {
    match &cli.config {
        Some(path) => nestor_config::load_config(path),
        None => Ok(nestor_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load(&cli)?;
    init_telemetry(&cli, &config.log);

    info!(version = env!("CARGO_PKG_VERSION"), "nestor starting");

    match cli.command {
        Commands::Send {
            channel,
            to,
            message,
            subject,
        } => channel_commands::send(&config, &channel, to, message, subject).await,
        Commands::Status => channel_commands::status(&config),
        Commands::Config { action } => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
    }
}
