use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ember_hub::api::ApiServer;
use ember_hub::db::{KvStore, PairedDeviceStore};
use ember_hub::{Config, DemoDriver, DriverRegistry, HubManager, InstanceCache, MdnsAdvertiser};

/// Ember - home hub for pluggable remote-control device drivers
#[derive(Parser)]
#[command(name = "ember", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "EMBER_PORT")]
    port: Option<u16>,

    /// Path to a config file (defaults to the platform config dir)
    #[arg(short, long, env = "EMBER_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Name under which this hub advertises itself
    #[arg(long, env = "EMBER_INSTANCE_NAME")]
    instance_name: Option<String>,

    /// Disable mDNS advertisement
    #[arg(long)]
    no_advertise: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List installed drivers
    Drivers,
    /// List paired devices
    Pairings,
    /// Remove a pairing
    Unpair {
        /// Pairing ID, e.g. "ember-demo.virtual-tv"
        pairing_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,ember_hub=info",
        1 => "info,ember_hub=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(name) = cli.instance_name {
        config.instance_name = name;
    }
    if cli.no_advertise {
        config.advertise = false;
    }

    let hub = build_hub(&config)?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Drivers => cmd_drivers(&hub),
            Command::Pairings => cmd_pairings(&hub),
            Command::Unpair { pairing_id } => cmd_unpair(&hub, &pairing_id),
        };
    }

    tracing::info!(
        instance = %config.instance_name,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "starting ember hub"
    );

    let advertiser = if config.advertise {
        let advertiser = MdnsAdvertiser::new()?;
        advertiser.start(&config.instance_name, config.port).await?;
        Some(advertiser)
    } else {
        None
    };

    let server = ApiServer::new(Arc::new(hub), config.port);
    let result = server.run().await;

    if let Some(advertiser) = advertiser {
        advertiser.stop().await;
    }

    result?;
    Ok(())
}

/// Wire up the hub manager from explicitly constructed collaborators
fn build_hub(config: &Config) -> anyhow::Result<HubManager> {
    let pool = ember_hub::db::init(config.db_path())?;
    let store = PairedDeviceStore::new(KvStore::new(pool));

    let mut registry = DriverRegistry::new();
    registry.register(Arc::new(DemoDriver::new()));

    let cache = InstanceCache::new(
        config.cache.max_entries,
        Duration::from_secs(config.cache.ttl_secs),
    );

    Ok(HubManager::new(Arc::new(registry), cache, store))
}

/// List installed drivers
fn cmd_drivers(hub: &HubManager) -> anyhow::Result<()> {
    let mut drivers = hub.list_drivers();
    drivers.sort_by(|a, b| a.driver_id.cmp(&b.driver_id));

    if drivers.is_empty() {
        println!("No drivers installed");
        return Ok(());
    }

    for driver in drivers {
        println!(
            "{}  {} ({:?}) - {}",
            driver.driver_id, driver.display_name, driver.authentication_method, driver.description
        );
    }
    Ok(())
}

/// List paired devices
fn cmd_pairings(hub: &HubManager) -> anyhow::Result<()> {
    let devices = hub.list_paired_devices()?;
    if devices.is_empty() {
        println!("No paired devices");
        return Ok(());
    }

    for device in devices {
        println!("{}  {}", device.pairing_id()?, device.device_name);
    }
    Ok(())
}

/// Remove a pairing
fn cmd_unpair(hub: &HubManager, pairing_id: &str) -> anyhow::Result<()> {
    hub.unpair(pairing_id)?;
    println!("Unpaired {pairing_id}");
    Ok(())
}
