//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which chain transactions are signed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production network.
    Mainnet,
    /// Proof-of-work test network.
    Ropsten,
    /// Proof-of-authority test network.
    Rinkeby,
}

impl Network {
    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Ropsten => 3,
            Self::Rinkeby => 4,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Ropsten => "ropsten",
            Self::Rinkeby => "rinkeby",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Self::Mainnet),
            "ropsten" | "testnet" => Some(Self::Ropsten),
            "rinkeby" => Some(Self::Rinkeby),
            _ => None,
        }
    }
}
