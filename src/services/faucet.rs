//! Off-chain faucet claim over HTTP.
//!
//! # Responsibilities
//! - POST `{"address": "0x…"}` with the browser-like header set the endpoint expects
//! - Extract the transaction hash from the free-text success message
//!
//! No retries here: the next round is the retry.

use alloy::primitives::Address;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER,
    USER_AGENT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::transaction::TransactionOutcome;
use crate::config::schema::FaucetConfig;

/// Marker preceding the hash in the faucet's success message.
const TX_HASH_MARKER: &str = "Txhash:";

/// Problems with the faucet's free-text message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response message has no 'Txhash:' marker")]
    MissingMarker,

    #[error("response message has an empty transaction hash")]
    EmptyHash,
}

/// Errors from a faucet request.
#[derive(Debug, Error)]
pub enum FaucetError {
    #[error("faucet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("faucet returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("invalid faucet header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Serialize)]
struct ClaimRequest {
    address: String,
}

#[derive(Debug, Deserialize)]
struct ClaimResponse {
    msg: Option<String>,
}

/// Pull the transaction hash out of a message like `"Claimed! Txhash: 0xABC"`.
///
/// The hash is the first whitespace-delimited token after the marker.
pub fn parse_faucet_message(msg: &str) -> Result<String, ParseError> {
    let (_, rest) = msg
        .split_once(TX_HASH_MARKER)
        .ok_or(ParseError::MissingMarker)?;
    rest.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or(ParseError::EmptyHash)
}

/// Client for the faucet claim endpoint.
#[derive(Clone)]
pub struct FaucetClient {
    client: reqwest::Client,
    url: String,
    enabled: bool,
}

impl FaucetClient {
    pub fn new(config: &FaucetConfig) -> Result<Self, FaucetError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers(config)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            enabled: config.enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Request a grant for `address`. Never fails; errors become the outcome.
    pub async fn claim(&self, address: Address) -> TransactionOutcome {
        match self.try_claim(address).await {
            Ok(tx_hash) => TransactionOutcome::success(tx_hash),
            Err(e) => TransactionOutcome::failed(e.to_string()),
        }
    }

    async fn try_claim(&self, address: Address) -> Result<String, FaucetError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&ClaimRequest {
                address: address.to_string(),
            })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(FaucetError::Status {
                status: status.as_u16(),
                body: truncate(&text, 200),
            });
        }

        let body: ClaimResponse = serde_json::from_str(&text)
            .map_err(|e| FaucetError::InvalidResponse(e.to_string()))?;
        let msg = body
            .msg
            .ok_or_else(|| FaucetError::InvalidResponse("missing 'msg' field".to_string()))?;

        Ok(parse_faucet_message(&msg)?)
    }
}

impl std::fmt::Debug for FaucetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaucetClient")
            .field("url", &self.url)
            .field("enabled", &self.enabled)
            .finish()
    }
}

fn browser_headers(config: &FaucetConfig) -> Result<HeaderMap, FaucetError> {
    fn value(name: &'static str, raw: &str) -> Result<HeaderValue, FaucetError> {
        HeaderValue::from_str(raw).map_err(|e| FaucetError::InvalidHeader {
            name,
            reason: e.to_string(),
        })
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US;q=0.6,en;q=0.5"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, value("origin", &config.origin)?);
    headers.insert(REFERER, value("referer", &config.referer)?);
    headers.insert(USER_AGENT, value("user-agent", &config.user_agent)?);

    let fixed: [(&'static str, &'static str); 7] = [
        (
            "sec-ch-ua",
            r#""Chromium";v="130", "Google Chrome";v="130", "Not?A_Brand";v="99""#,
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""Windows""#),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-origin"),
        ("priority", "u=1, i"),
    ];
    for (name, raw) in fixed {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(raw));
    }

    Ok(headers)
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
