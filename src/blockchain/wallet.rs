//! Wallet ingestion: raw private keys → ordered accounts.
//!
//! # Security
//! - Keys are never logged or serialized; errors cite line numbers only
//! - Only the masked address is printed by the rest of the crate

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::observability::redact::mask_address;

/// Errors raised while loading the key file. All of them are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key file contains no private keys")]
    Empty,

    /// The offending key is deliberately not part of the message.
    #[error("invalid private key on line {line}")]
    InvalidKey { line: usize },
}

/// A signing account derived from one private key.
#[derive(Clone)]
pub struct Account {
    address: Address,
    signer: PrivateKeySigner,
}

impl Account {
    /// Derive an account from a raw key (with or without `0x`).
    pub fn from_raw_key(raw: &str) -> BlockchainResult<Self> {
        let signer: PrivateKeySigner = normalize_key(raw)
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self {
            address: signer.address(),
            signer,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn masked_address(&self) -> String {
        mask_address(&self.address.to_string())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.masked_address())
            .finish_non_exhaustive()
    }
}

/// Canonical hex form: trimmed and `0x`-prefixed.
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        format!("0x{}", &trimmed[2..])
    } else {
        format!("0x{}", trimmed)
    }
}

/// Loads the ordered wallet list once at startup.
pub struct WalletStore;

impl WalletStore {
    /// Read and parse a newline-delimited key file.
    pub fn load(path: &Path) -> Result<Vec<Account>, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let accounts = Self::parse(&content)?;

        tracing::info!(
            wallets = accounts.len(),
            path = %path.display(),
            "Successfully loaded wallets"
        );
        Ok(accounts)
    }

    /// Parse key material. Blank lines, `\r` and surrounding whitespace are ignored.
    pub fn parse(content: &str) -> Result<Vec<Account>, LoadError> {
        let accounts = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.replace('\r', "")))
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_no, line)| {
                Account::from_raw_key(&line).map_err(|_| LoadError::InvalidKey { line: line_no })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if accounts.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(accounts)
    }
}
