use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use reward_harvester::blockchain::gateway::format_gwei;
use reward_harvester::blockchain::{Account, ChainGateway, WalletStore};
use reward_harvester::config::{load_or_default, HarvesterConfig};
use reward_harvester::observability::logging;
use reward_harvester::services::RewardService;

#[derive(Parser)]
#[command(name = "harvester-cli")]
#[command(about = "Inspect wallets and chain state for the reward harvester", long_about = None)]
struct Cli {
    /// TOML configuration file (default: ./harvester.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Private key file, overrides schedule.keys_file
    #[arg(short, long)]
    keys: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded wallets (masked)
    Wallets,
    /// Show the native balance of every wallet
    Balances,
    /// Show the gas price the harvester would use right now
    Gas,
    /// Show reward epoch and claim status per wallet
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(keys) = cli.keys {
        config.schedule.keys_file = keys;
    }
    logging::init_logging("warn");

    match cli.command {
        Commands::Wallets => {
            let accounts = WalletStore::load(&config.schedule.keys_file)?;
            let wallets: Vec<Value> = accounts
                .iter()
                .enumerate()
                .map(|(i, a)| json!({ "index": i + 1, "address": a.masked_address() }))
                .collect();
            print_json(&json!({ "count": accounts.len(), "wallets": wallets }))?;
        }
        Commands::Balances => {
            let accounts = WalletStore::load(&config.schedule.keys_file)?;
            let gateway = connect(&config).await?;
            let mut rows = Vec::with_capacity(accounts.len());
            for account in &accounts {
                let balance = gateway.get_balance(account.address()).await;
                rows.push(json!({
                    "address": account.masked_address(),
                    "balance": balance.to_string(),
                }));
            }
            print_json(&Value::Array(rows))?;
        }
        Commands::Gas => {
            let gateway = connect(&config).await?;
            let price = gateway.safe_gas_price().await;
            print_json(&json!({
                "chain_id": gateway.chain_id(),
                "gas_price_wei": price.wei.to_string(),
                "gas_price_gwei": format_gwei(price.wei),
                "source": price.source,
                "default_gas_limit": config.gas.default_gas_limit,
            }))?;
        }
        Commands::Status => {
            let accounts = WalletStore::load(&config.schedule.keys_file)?;
            let gateway = connect(&config).await?;
            let rewards = RewardService::new(gateway, config.reward.clone());
            let mut rows = Vec::with_capacity(accounts.len());
            for account in &accounts {
                rows.push(status_row(&rewards, account).await);
            }
            print_json(&Value::Array(rows))?;
        }
    }

    Ok(())
}

async fn connect(config: &HarvesterConfig) -> Result<ChainGateway, Box<dyn std::error::Error>> {
    Ok(ChainGateway::connect(&config.chain, &config.gas).await?)
}

async fn status_row(rewards: &RewardService, account: &Account) -> Value {
    match rewards.claim_status(account.address()).await {
        Ok(status) => json!({
            "address": account.masked_address(),
            "epoch": status.epoch.to_string(),
            "genesis_claimed": status.genesis_claimed,
            "epoch_claimed": status.epoch_claimed,
            "buffer": status.buffer.to_string(),
        }),
        Err(e) => json!({
            "address": account.masked_address(),
            "error": e.to_string(),
        }),
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
