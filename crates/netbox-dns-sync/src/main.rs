// # netbox-dns-sync
//
// Thin command-line front end over netbox-dns-core. All translation and
// reconciliation logic lives in the core crate.
//
// The binary is responsible for:
// 1. Reading configuration from the environment (or a JSON file)
// 2. Initializing logging and the runtime
// 3. Running one populate or apply command
//
// ## Commands
//
// - `netbox-dns-sync populate <zone>`: print the zone's canonical records as JSON
// - `netbox-dns-sync apply <zone> <changes.json>`: apply a change file
//
// Exit codes: 0 on success, 1 for usage or configuration errors (including
// an unknown view), 2 for anything that fails at runtime.
//
// ## Configuration
//
// - `NETBOX_DNS_CONFIG`: JSON configuration file; when set, the variables
//   below except the log level are ignored
// - `NETBOX_DNS_URL`: NetBox base URL
// - `NETBOX_DNS_TOKEN`: API token
// - `NETBOX_DNS_VIEW`: View name; `null` selects zones without a view, unset
//   means any view
// - `NETBOX_DNS_TTL`: Default TTL for zones that report none (default 3600)
// - `NETBOX_DNS_MAKE_ABSOLUTE`: Make CNAME/MX/SRV targets absolute
// - `NETBOX_DNS_REPLACE_DUPLICATES`: Let populated records replace same-key records
// - `NETBOX_DNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export NETBOX_DNS_URL=https://netbox.example.com
// export NETBOX_DNS_TOKEN=your_token
// export NETBOX_DNS_VIEW=external
//
// netbox-dns-sync populate example.com.
// netbox-dns-sync apply example.com. changes.json
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netbox_dns_client::NetboxClient;
use netbox_dns_core::model::{ChangeSpec, Zone};
use netbox_dns_core::{Error as CoreError, NetboxDnsSource, SourceConfig, ViewSelector};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: Success
/// - 1: Configuration or usage error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Populate and apply NetBox DNS zones
#[derive(Parser, Debug)]
#[command(name = "netbox-dns-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the zone's canonical records as JSON
    Populate {
        /// Zone name, e.g. example.com.
        zone: String,
    },

    /// Apply a JSON change file to the zone
    Apply {
        /// Zone name, e.g. example.com.
        zone: String,

        /// Path to the change file
        changes: PathBuf,
    },
}

/// Exit code for a failed run
///
/// An unknown view or a bad setting only shows up once the source is built,
/// but it is still a configuration problem.
fn exit_code_for(error: &anyhow::Error) -> SyncExitCode {
    match error.downcast_ref::<CoreError>() {
        Some(CoreError::ViewNotFound(_) | CoreError::Config(_)) => SyncExitCode::ConfigError,
        _ => SyncExitCode::RuntimeError,
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean. Got: {}", name, value),
    }
}

/// Load the source configuration
fn load_config() -> Result<SourceConfig> {
    if let Ok(path) = env::var("NETBOX_DNS_CONFIG") {
        return SourceConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path));
    }

    let url = env::var("NETBOX_DNS_URL").context(
        "NETBOX_DNS_URL is required. Set it via: export NETBOX_DNS_URL=https://netbox.example.com",
    )?;
    let token = env::var("NETBOX_DNS_TOKEN")
        .context("NETBOX_DNS_TOKEN is required. Set it via: export NETBOX_DNS_TOKEN=your_token")?;

    let mut config = SourceConfig::new(url, token);
    if let Ok(view) = env::var("NETBOX_DNS_VIEW") {
        config.view = ViewSelector::from_env_value(&view);
    }
    if let Ok(ttl) = env::var("NETBOX_DNS_TTL") {
        config.ttl = ttl
            .parse()
            .with_context(|| format!("NETBOX_DNS_TTL must be a number of seconds. Got: {}", ttl))?;
    }
    if let Ok(value) = env::var("NETBOX_DNS_MAKE_ABSOLUTE") {
        config.make_absolute = parse_bool("NETBOX_DNS_MAKE_ABSOLUTE", &value)?;
    }
    if let Ok(value) = env::var("NETBOX_DNS_REPLACE_DUPLICATES") {
        config.replace_duplicates = parse_bool("NETBOX_DNS_REPLACE_DUPLICATES", &value)?;
    }
    Ok(config)
}

fn log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "NETBOX_DNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn main() -> ExitCode {
    let command = match Cli::try_parse() {
        Ok(cli) => cli.command,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            let code = if e.use_stderr() {
                SyncExitCode::ConfigError
            } else {
                SyncExitCode::Success
            };
            return code.into();
        }
    };

    let level = match log_level(&env::var("NETBOX_DNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr; stdout carries the command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let config = match load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    info!(config = ?config, "configuration loaded");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config, command).await {
            Ok(()) => SyncExitCode::Success,
            Err(e) => {
                let lookup_failure = e
                    .downcast_ref::<CoreError>()
                    .is_some_and(|e| e.is_lookup_failure());
                if lookup_failure {
                    error!("Lookup failed: {}", e);
                } else {
                    error!("Error: {:#}", e);
                }
                exit_code_for(&e)
            }
        }
    })
    .into()
}

async fn run(config: SourceConfig, command: Command) -> Result<()> {
    let client = NetboxClient::from_config(&config)?;
    let source = NetboxDnsSource::new(Box::new(client), config).await?;

    match command {
        Command::Populate { zone } => {
            let mut zone = Zone::new(zone);
            source.populate(&mut zone, false).await?;
            println!("{}", serde_json::to_string_pretty(&zone)?);
        }
        Command::Apply { zone, changes } => {
            let contents = std::fs::read_to_string(&changes)
                .with_context(|| format!("Failed to read change file {}", changes.display()))?;
            let specs: Vec<ChangeSpec> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid change file {}", changes.display()))?;
            let changes = source.decode_changes(&specs)?;

            let summary = source.apply(&zone, &changes).await?;
            println!(
                "{}",
                serde_json::json!({
                    "created": summary.created,
                    "deleted": summary.deleted,
                    "ttl_updated": summary.ttl_updated,
                })
            );
        }
    }
    Ok(())
}
