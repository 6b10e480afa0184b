//! Tokens and the amount moved by a transfer.
//!
//! A transfer moves either ether or a quantity of some ERC20 token. Token
//! quantities are integers in the token's smallest unit, scaled for display by
//! the token's `decimals`.

use std::fmt;
use std::sync::Arc;

use crate::address::Address;
use crate::error::NumericError;
use crate::ether::Ether;
use crate::gas::{Gas, GasPrice};
use crate::u256::U256;

/// An ERC20 token contract known to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub decimals: u32,
    pub default_gas_limit: Gas,
    pub default_gas_price: GasPrice,
}

/// An amount of a specific token, in the token's smallest unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenQuantity {
    token: Arc<Token>,
    value: U256,
}

impl TokenQuantity {
    pub fn new(token: Arc<Token>, value: U256) -> Self {
        Self { token, value }
    }

    /// Parse a decimal string in whole tokens, e.g. `"5968.77"`.
    pub fn from_string(token: Arc<Token>, s: &str) -> Result<Self, NumericError> {
        let value = U256::parse_decimal(s, token.decimals)?;
        Ok(Self { token, value })
    }

    pub fn token(&self) -> &Arc<Token> {
        &self.token
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn to_decimal_string(&self) -> String {
        self.value.to_decimal_string(self.token.decimals)
    }
}

impl fmt::Display for TokenQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal_string(), self.token.symbol)
    }
}

/// The value moved by a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Amount {
    Ether(Ether),
    Token(TokenQuantity),
}

impl Amount {
    /// Default gas to budget for moving this amount.
    pub fn gas_estimate(&self) -> Gas {
        match self {
            Self::Ether(_) => Gas::NATIVE_TRANSFER,
            Self::Token(quantity) => quantity.token.default_gas_limit,
        }
    }

    /// The token moved, or `None` for ether.
    pub fn token(&self) -> Option<&Arc<Token>> {
        match self {
            Self::Ether(_) => None,
            Self::Token(quantity) => Some(&quantity.token),
        }
    }

    /// Raw integer value: WEI for ether, smallest unit for tokens.
    pub fn raw_value(&self) -> U256 {
        match self {
            Self::Ether(ether) => ether.wei(),
            Self::Token(quantity) => quantity.value,
        }
    }

    /// A zero amount of the same kind.
    pub fn zero_like(&self) -> Self {
        match self {
            Self::Ether(_) => Self::Ether(Ether::ZERO),
            Self::Token(quantity) => {
                Self::Token(TokenQuantity::new(quantity.token.clone(), U256::ZERO))
            }
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ether(ether) => write!(f, "{ether}"),
            Self::Token(quantity) => write!(f, "{quantity}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ether::EtherUnit;

    fn brd() -> Arc<Token> {
        Arc::new(Token {
            address: "0x558ec3152e2eb2174905cd19aea4e34a23de9ad6".parse().unwrap(),
            symbol: "BRD".into(),
            name: "BRD Token".into(),
            description: "The BRD token".into(),
            decimals: 18,
            default_gas_limit: Gas::new(92_000),
            default_gas_price: GasPrice::from_number(2, EtherUnit::Gwei).unwrap(),
        })
    }

    #[test]
    fn token_quantity_parses_decimals() {
        let quantity = TokenQuantity::from_string(brd(), "5968.77").unwrap();
        assert_eq!(quantity.value().to_string(), "5968770000000000000000");
        assert_eq!(quantity.to_string(), "5968.77 BRD");
    }

    #[test]
    fn gas_estimate_depends_on_kind() {
        let ether = Amount::Ether(Ether::from_number(1, EtherUnit::Ether).unwrap());
        assert_eq!(ether.gas_estimate(), Gas::NATIVE_TRANSFER);
        let token = Amount::Token(TokenQuantity::new(brd(), U256::ONE));
        assert_eq!(token.gas_estimate(), Gas::new(92_000));
    }

    #[test]
    fn zero_like_keeps_token() {
        let token = Amount::Token(TokenQuantity::new(brd(), U256::from_u64(5)));
        let zero = token.zero_like();
        assert_eq!(zero.raw_value(), U256::ZERO);
        assert_eq!(zero.token().map(|t| t.symbol.as_str()), Some("BRD"));
    }
}
