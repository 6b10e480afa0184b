//! Gas, gas price and fee basis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::NumericError;
use crate::ether::{Ether, EtherUnit};
use crate::u256::U256;

/// Percentage added to an external gas estimate to form a gas limit.
pub const GAS_LIMIT_MARGIN_PERCENT: u64 = 20;

/// An amount of gas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Gas(u64);

impl Gas {
    /// Fixed cost of a plain native-coin transfer.
    pub const NATIVE_TRANSFER: Self = Self(21_000);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> u64 {
        self.0
    }

    /// Gas limit to use for this estimate.
    ///
    /// Adds [`GAS_LIMIT_MARGIN_PERCENT`], except for the fixed native-transfer
    /// cost which is exact.
    pub fn with_margin(&self) -> Self {
        if *self == Self::NATIVE_TRANSFER {
            return *self;
        }
        let limit = self.0 as u128 * (100 + GAS_LIMIT_MARGIN_PERCENT) as u128 / 100;
        Self(u64::try_from(limit).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gas", self.0)
    }
}

/// Price paid per unit of gas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GasPrice(Ether);

impl GasPrice {
    pub fn new(per_gas: Ether) -> Self {
        Self(per_gas)
    }

    pub fn from_number(value: u64, unit: EtherUnit) -> Result<Self, NumericError> {
        Ether::from_number(value, unit).map(Self)
    }

    pub fn ether(&self) -> Ether {
        self.0
    }

    /// Total cost of `gas` at this price.
    pub fn cost_of(&self, gas: Gas) -> Result<Ether, NumericError> {
        self.0
            .wei()
            .checked_mul(U256::from_u64(gas.amount()))
            .map(Ether::from_wei)
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gwei/gas", self.0.to_string_in(EtherUnit::Gwei))
    }
}

/// How a transfer pays its fee.
///
/// Log-backed transfers carry no fee of their own and use [`FeeBasis::None`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeeBasis {
    #[default]
    None,
    Gas { limit: Gas, price: GasPrice },
}

impl FeeBasis {
    pub fn gas(limit: Gas, price: GasPrice) -> Self {
        Self::Gas { limit, price }
    }

    /// `limit × price`, or zero for [`FeeBasis::None`].
    pub fn fee(&self) -> Result<Ether, NumericError> {
        match self {
            Self::None => Ok(Ether::ZERO),
            Self::Gas { limit, price } => price.cost_of(*limit),
        }
    }

    pub fn limit(&self) -> Option<Gas> {
        match self {
            Self::None => None,
            Self::Gas { limit, .. } => Some(*limit),
        }
    }

    pub fn price(&self) -> Option<GasPrice> {
        match self {
            Self::None => None,
            Self::Gas { price, .. } => Some(*price),
        }
    }
}
