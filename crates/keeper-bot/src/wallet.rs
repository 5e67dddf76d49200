//! Wallet credential loading.
//!
//! The signing key is never stored in the config file. It is loaded once
//! at startup from the environment (development) or a key file
//! (production, recommend 0600 permissions), and the raw bytes are wiped
//! when the wallet is dropped. Never log key material.

use keeper_core::AccountId;
use std::path::PathBuf;
use thiserror::Error;
use zeroize::Zeroizing;

/// Environment variable the key is read from by default.
pub const WALLET_KEY_VAR: &str = "KEEPER_WALLET_KEY";

/// Expected secret key length in bytes.
const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of the signing key.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production).
    File { path: PathBuf },
}

impl Default for KeySource {
    fn default() -> Self {
        Self::EnvVar {
            var_name: WALLET_KEY_VAR.to_string(),
        }
    }
}

/// The bot's signing credential paired with the account it controls.
pub struct Wallet {
    secret: Zeroizing<Vec<u8>>,
    account: AccountId,
}

impl Wallet {
    /// Load the key from `source` for `account`.
    ///
    /// Accepts hex with or without a `0x` prefix, whitespace trimmed.
    pub fn load(source: &KeySource, account: AccountId) -> Result<Self, WalletError> {
        let secret = match source {
            KeySource::EnvVar { var_name } => {
                let hex = std::env::var(var_name)
                    .map_err(|_| WalletError::EnvVarNotFound(var_name.clone()))?;
                parse_hex_key(&hex)?
            }
            KeySource::File { path } => {
                let content = std::fs::read_to_string(path)?;
                parse_hex_key(&content)?
            }
        };
        Self::from_secret(secret, account)
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The raw key bytes, for handing to a transaction signer.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    fn from_secret(secret: Zeroizing<Vec<u8>>, account: AccountId) -> Result<Self, WalletError> {
        if secret.len() != KEY_LEN {
            return Err(WalletError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                secret.len()
            )));
        }
        Ok(Self { secret, account })
    }

    #[cfg(test)]
    pub fn from_bytes(secret: &[u8], account: AccountId) -> Result<Self, WalletError> {
        Self::from_secret(Zeroizing::new(secret.to_vec()), account)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn parse_hex_key(hex_str: &str) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let trimmed = hex_str.trim().trim_start_matches("0x");
    Ok(Zeroizing::new(hex::decode(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountId {
        AccountId::parse("beef01").unwrap()
    }

    #[test]
    fn test_valid_key_length() {
        let wallet = Wallet::from_bytes(&[7u8; 32], account()).unwrap();
        assert_eq!(wallet.account(), &account());
        assert_eq!(wallet.secret().len(), 32);
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        let err = Wallet::from_bytes(&[7u8; 31], account()).unwrap_err();
        assert!(matches!(err, WalletError::InvalidKey(_)));
    }

    #[test]
    fn test_parse_hex_key_strips_prefix_and_whitespace() {
        let bytes = parse_hex_key(" 0xdeadbeef\n").unwrap();
        assert_eq!(&*bytes, &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let wallet = Wallet::from_bytes(&[7u8; 32], account()).unwrap();
        let rendered = format!("{wallet:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("7, 7"));
    }
}
