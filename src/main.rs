//! reward-harvester daemon.
//!
//! ```text
//! config → logging → banner → wallets → metrics → node → services
//!     → orchestrator (spawned) ⇄ signal handler
//! ```
//!
//! Startup failures (config, key file, node) exit non-zero before the first
//! round. A panic escaping the orchestrator task does the same.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use reward_harvester::blockchain::{ChainGateway, WalletStore};
use reward_harvester::config::{load_or_default, HarvesterConfig};
use reward_harvester::console::{Console, TerminalConsole};
use reward_harvester::lifecycle::{signals, Shutdown};
use reward_harvester::observability::{logging, metrics};
use reward_harvester::orchestrator::{Orchestrator, Pacer, Services};
use reward_harvester::services::{BridgeService, FaucetClient, RewardService};

#[derive(Parser)]
#[command(name = "reward-harvester", version)]
#[command(about = "Daily faucet, reward and bridge cycle across many wallets", long_about = None)]
struct Cli {
    /// TOML configuration file (default: ./harvester.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Private key file, overrides schedule.keys_file
    #[arg(short, long)]
    keys: Option<PathBuf>,

    /// Stop after this many rounds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    rounds: Option<u64>,

    /// Log level, overrides observability.log_level
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut HarvesterConfig) {
        if let Some(keys) = self.keys {
            config.schedule.keys_file = keys;
        }
        if let Some(rounds) = self.rounds {
            config.schedule.max_rounds = Some(rounds);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let mut config = load_or_default(config_path.as_deref())?;
    cli.apply(&mut config);

    logging::init_logging(&config.observability.log_level);

    let console: Arc<dyn Console> = Arc::new(TerminalConsole);
    console.banner();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc_url = %config.chain.rpc_url,
        keys_file = %config.schedule.keys_file.display(),
        "reward-harvester starting"
    );

    let accounts = WalletStore::load(&config.schedule.keys_file)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }
    metrics::record_wallets(accounts.len());

    let gateway = ChainGateway::connect(&config.chain, &config.gas).await?;
    let services = Services {
        faucet: FaucetClient::new(&config.faucet)?,
        reward: RewardService::new(gateway.clone(), config.reward.clone()),
        bridge: BridgeService::new(gateway.clone(), config.bridge.clone()),
    };

    let shutdown = Shutdown::new();
    let pacer = Pacer::new(console, Some(shutdown.subscribe()));
    let signal_task = signals::spawn_signal_handler(shutdown.clone());

    let orchestrator = Orchestrator::new(accounts, gateway, services, config.schedule, pacer);
    let handle = tokio::spawn(orchestrator.run());

    // A JoinError here means the loop itself panicked
    let summary = handle.await?;
    signal_task.abort();

    tracing::info!(
        rounds = summary.rounds_completed,
        succeeded = summary.totals.succeeded,
        failed = summary.totals.failed,
        skipped = summary.totals.skipped,
        panicked = summary.totals.panicked,
        "Shutdown complete"
    );
    Ok(())
}
