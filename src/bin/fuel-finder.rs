use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fuel_finder::config::loader::load_config;
use fuel_finder::config::settings::ClientConfig;
use fuel_finder::observability::metrics::gather_metrics;
use fuel_finder::utils::logging::{self, LogLevel};
use fuel_finder::FuelFinderClient;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config; flags and env override its values
    #[arg(short, long, env = "FUEL_FINDER_CONFIG")]
    config: Option<String>,
    #[arg(long, env = "FUEL_FINDER_CLIENT_ID")]
    client_id: Option<String>,
    #[arg(long, env = "FUEL_FINDER_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    #[arg(long, env = "FUEL_FINDER_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, env = "FUEL_FINDER_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Dump prometheus metrics to stderr after the command
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a valid access token
    Token,
    /// Fuel prices, optionally only those changed since `YYYY-MM-DD HH:MM:SS`
    Prices {
        #[arg(long)]
        since: Option<String>,
    },
    /// Station details, optionally only those changed since `YYYY-MM-DD HH:MM:SS`
    Stations {
        #[arg(long)]
        since: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Resolve config
    // -------------------------------

    let config = resolve_config(&args)?;
    logging::init_logging(&logging::resolve(config.logging.as_ref(), args.log_level));

    // -------------------------------
    // 2. Build client
    // -------------------------------

    let client = FuelFinderClient::from_config(&config)?;
    info!("client ready for {}", client.auth().base_url());

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match &args.command {
        Command::Token => println!("{}", client.get_access_token().await?),
        Command::Prices { since: None } => print_json(&client.get_all_pfs_fuel_prices().await?)?,
        Command::Prices { since: Some(since) } => {
            print_json(&client.get_incremental_pfs_fuel_prices(since).await?)?
        }
        Command::Stations { since: None } => print_json(&client.get_pfs_info().await?)?,
        Command::Stations { since: Some(since) } => {
            print_json(&client.get_incremental_pfs_info(since).await?)?
        }
    }

    if args.print_metrics {
        eprintln!("{}", gather_metrics().await?);
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ClientConfig {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: None,
            timeout_ms: None,
            logging: None,
        },
    };

    if let Some(client_id) = &args.client_id {
        config.client_id = client_id.clone();
    }
    if let Some(client_secret) = &args.client_secret {
        config.client_secret = client_secret.clone();
    }
    if args.base_url.is_some() {
        config.base_url = args.base_url.clone();
    }
    if args.timeout_ms.is_some() {
        config.timeout_ms = args.timeout_ms;
    }

    if config.client_id.is_empty() || config.client_secret.is_empty() {
        return Err(anyhow!("client credentials missing: pass --client-id/--client-secret, set FUEL_FINDER_CLIENT_ID/FUEL_FINDER_CLIENT_SECRET, or use --config"));
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
