//! Shared fixtures for integration tests: a scripted node and a mock faucet.
#![allow(dead_code)]

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use reward_harvester::blockchain::gateway::ConfirmationPolicy;
use reward_harvester::blockchain::rpc::{NodeRpc, ReceiptSummary};
use reward_harvester::blockchain::types::{BlockchainError, BlockchainResult};
use reward_harvester::blockchain::{Account, ChainGateway};
use reward_harvester::config::schema::{
    BridgeConfig, FaucetConfig, GasConfig, HarvesterConfig, RewardConfig, ScheduleConfig,
};
use reward_harvester::console::SilentConsole;
use reward_harvester::orchestrator::{Orchestrator, Pacer, Services};
use reward_harvester::services::{BridgeService, FaucetClient, RewardService};

pub const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const CHAIN_ID: u64 = 1942999413;
pub const GWEI: u128 = 1_000_000_000;

pub fn account(key: &str) -> Account {
    Account::from_raw_key(key).unwrap()
}

pub fn ether(value: &str) -> U256 {
    alloy::primitives::utils::parse_ether(value).unwrap()
}

/// One ABI word.
pub fn word(value: U256) -> Vec<u8> {
    value.to_be_bytes::<32>().to_vec()
}

/// How the fake answers `eth_call` for one contract.
#[derive(Debug, Clone)]
pub enum CallBehavior {
    Return(Bytes),
    Revert(String),
    Fail(String),
}

/// A transaction the fake accepted through `send_raw_transaction`.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub hash: TxHash,
    pub envelope: TxEnvelope,
}

#[derive(Debug)]
pub struct FakeState {
    pub balances: HashMap<Address, U256>,
    pub gas_price: Result<u128, String>,
    pub estimate: Result<u64, String>,
    pub calls: HashMap<Address, CallBehavior>,
    /// Checked before `calls`; keyed by function selector.
    pub selector_calls: HashMap<[u8; 4], CallBehavior>,
    pub receipt_success: bool,
    /// Never produce a receipt.
    pub receipts_pending: bool,
    pub block_number: u64,
    /// Added to `block_number` after every `get_block_number` answer.
    pub block_advance: u64,
    pub block_polls: usize,
    /// Inclusion block reported by receipts; defaults to the current block.
    pub receipt_block: Option<u64>,
    /// Panic inside `estimate_gas` for this (from, to) pair.
    pub panic_on_estimate: Option<(Address, Address)>,
    pub sent: Vec<SentTx>,
    pub log: Vec<String>,
}

/// Scripted in-memory node.
///
/// The lock is never held across a panic, so an injected panic leaves the
/// fake usable for the accounts that follow.
#[derive(Debug)]
pub struct FakeNode {
    state: Mutex<FakeState>,
}

impl FakeNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                balances: HashMap::new(),
                gas_price: Ok(2 * GWEI),
                estimate: Ok(50_000),
                calls: HashMap::new(),
                selector_calls: HashMap::new(),
                receipt_success: true,
                receipts_pending: false,
                block_number: 100,
                block_advance: 0,
                block_polls: 0,
                receipt_block: None,
                panic_on_estimate: None,
                sent: Vec::new(),
                log: Vec::new(),
            }),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.with(|s| {
            s.balances.insert(address, wei);
        });
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.with(|s| s.sent.clone())
    }

    pub fn sent_to(&self, to: Address) -> Vec<SentTx> {
        use alloy::consensus::Transaction;
        self.sent()
            .into_iter()
            .filter(|tx| tx.envelope.to() == Some(to))
            .collect()
    }

    pub fn log(&self) -> Vec<String> {
        self.with(|s| s.log.clone())
    }

    fn record(&self, entry: impl Into<String>) {
        self.with(|s| s.log.push(entry.into()));
    }
}

#[async_trait]
impl NodeRpc for FakeNode {
    async fn get_chain_id(&self) -> BlockchainResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        Ok(self.with(|s| {
            let current = s.block_number;
            s.block_number += s.block_advance;
            s.block_polls += 1;
            current
        }))
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.record("get_balance");
        Ok(self.with(|s| s.balances.get(&address).copied().unwrap_or_default()))
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.with(|s| s.sent.len() as u64))
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.record("get_gas_price");
        self.with(|s| s.gas_price.clone()).map_err(BlockchainError::Rpc)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> BlockchainResult<u64> {
        self.record("estimate_gas");
        let from = request.from.unwrap_or_default();
        let to = request.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let (panic_target, estimate) = self.with(|s| (s.panic_on_estimate, s.estimate.clone()));
        if panic_target == Some((from, to)) {
            panic!("injected panic for {from}");
        }
        estimate.map_err(BlockchainError::Rpc)
    }

    async fn call(&self, request: TransactionRequest) -> BlockchainResult<Bytes> {
        self.record("call");
        let to = request.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let selector: Option<[u8; 4]> = request
            .input
            .input()
            .and_then(|data| data.get(..4))
            .and_then(|head| head.try_into().ok());
        let behavior = self.with(|s| {
            selector
                .and_then(|sel| s.selector_calls.get(&sel).cloned())
                .or_else(|| s.calls.get(&to).cloned())
        });
        match behavior {
            None => Ok(Bytes::new()),
            Some(CallBehavior::Return(data)) => Ok(data),
            Some(CallBehavior::Revert(reason)) => Err(BlockchainError::Reverted(reason)),
            Some(CallBehavior::Fail(message)) => Err(BlockchainError::Rpc(message)),
        }
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.record("send_raw_transaction");
        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        let hash = keccak256(raw);
        self.with(|s| s.sent.push(SentTx { hash, envelope }));
        Ok(hash)
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        Ok(self.with(|s| {
            if s.receipts_pending {
                return None;
            }
            s.sent.iter().find(|tx| tx.hash == tx_hash).map(|_| ReceiptSummary {
                block_number: Some(s.receipt_block.unwrap_or(s.block_number)),
                success: s.receipt_success,
            })
        }))
    }
}

pub fn gateway(node: Arc<FakeNode>) -> ChainGateway {
    gateway_with(
        node,
        ConfirmationPolicy {
            required_blocks: 1,
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
        },
    )
}

pub fn gateway_with(node: Arc<FakeNode>, confirmation: ConfirmationPolicy) -> ChainGateway {
    ChainGateway::new(node, GasConfig::default(), CHAIN_ID, confirmation)
}

pub fn reward_config() -> RewardConfig {
    RewardConfig::default()
}

pub fn bridge_config() -> BridgeConfig {
    BridgeConfig::default()
}

pub fn faucet_config(url: &str) -> FaucetConfig {
    FaucetConfig {
        url: url.to_string(),
        timeout_secs: 5,
        ..FaucetConfig::default()
    }
}

/// Orchestrator over `accounts` with no pauses and a silent console.
pub fn orchestrator(
    node: Arc<FakeNode>,
    faucet_url: &str,
    accounts: Vec<Account>,
    rounds: u64,
) -> Orchestrator {
    orchestrator_with(
        node,
        faucet_url,
        accounts,
        ScheduleConfig::immediate(rounds),
        Pacer::new(Arc::new(SilentConsole), None),
    )
}

pub fn orchestrator_with(
    node: Arc<FakeNode>,
    faucet_url: &str,
    accounts: Vec<Account>,
    schedule: ScheduleConfig,
    pacer: Pacer,
) -> Orchestrator {
    let config = HarvesterConfig::default();
    let gateway = gateway(node);
    let services = Services {
        faucet: FaucetClient::new(&faucet_config(faucet_url)).unwrap(),
        reward: RewardService::new(gateway.clone(), config.reward),
        bridge: BridgeService::new(gateway.clone(), config.bridge),
    };
    Orchestrator::new(accounts, gateway, services, schedule, pacer)
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// One request as seen by the mock faucet.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: String,
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` receives each request body and returns `(status, body)`. Requests are
/// read in full before answering so the client never sees a reset.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let body = request.body.clone();
                        recorded.lock().unwrap().push(request);

                        let (status, body) = f(body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some(RecordedRequest { head, body })
}

/// Mock faucet answering every claim with the same status and body.
pub async fn start_faucet(status: u16, body: &'static str) -> (String, RequestLog) {
    let (addr, requests) =
        start_programmable_backend(move |_| async move { (status, body.to_string()) }).await;
    (format!("http://{}/api/claim", addr), requests)
}
