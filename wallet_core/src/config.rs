//! Session configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use ewm_transactions::TokenRegistry;
use ewm_types::{Address, Ether, Gas, GasPrice, Network, Token, U256};

use crate::error::WalletError;

/// Configuration for a wallet session.
///
/// Can be loaded from a TOML file via [`EwmConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwmConfig {
    /// Which network transactions are signed for.
    #[serde(default = "default_network")]
    pub network: Network,

    /// Fallback gas price for ether transfers, in WEI.
    #[serde(default = "default_gas_price_wei")]
    pub default_gas_price_wei: u64,

    /// Gas limit for ether transfers.
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// ERC20 tokens to register at startup.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// One `[[tokens]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_token_decimals")]
    pub decimals: u32,
    #[serde(default = "default_token_gas_limit")]
    pub default_gas_limit: u64,
    #[serde(default = "default_token_gas_price_wei")]
    pub default_gas_price_wei: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> Network {
    Network::Mainnet
}

fn default_gas_price_wei() -> u64 {
    500_000_000
}

fn default_gas_limit() -> u64 {
    Gas::NATIVE_TRANSFER.amount()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_decimals() -> u32 {
    18
}

fn default_token_gas_limit() -> u64 {
    92_000
}

fn default_token_gas_price_wei() -> u64 {
    2_000_000_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EwmConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WalletError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn default_gas_price(&self) -> GasPrice {
        GasPrice::new(Ether::from_wei(U256::from_u64(self.default_gas_price_wei)))
    }

    /// Registry holding every configured token.
    pub fn token_registry(&self) -> Result<TokenRegistry, WalletError> {
        let mut registry = TokenRegistry::new();
        for entry in &self.tokens {
            registry.insert(entry.to_token()?);
        }
        Ok(registry)
    }
}

impl TokenConfig {
    pub fn to_token(&self) -> Result<Token, WalletError> {
        let address = Address::from_hex(&self.address)
            .map_err(|e| WalletError::Config(format!("token {}: {e}", self.symbol)))?;
        Ok(Token {
            address,
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            decimals: self.decimals,
            default_gas_limit: Gas::new(self.default_gas_limit),
            default_gas_price: GasPrice::new(Ether::from_wei(U256::from_u64(
                self.default_gas_price_wei,
            ))),
        })
    }
}

impl Default for EwmConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            default_gas_price_wei: default_gas_price_wei(),
            default_gas_limit: default_gas_limit(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            tokens: Vec::new(),
        }
    }
}
