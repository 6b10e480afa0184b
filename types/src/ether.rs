//! Native-coin amounts and their denominations.
//!
//! An [`Ether`] is a count of WEI held in a [`U256`]. Denominations step by
//! factors of one thousand, from WEI (10^0) to TETHER (10^30).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::NumericError;
use crate::u256::U256;

/// Ether denominations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EtherUnit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
    Kether,
    Mether,
    Gether,
    Tether,
}

impl EtherUnit {
    pub const ALL: [EtherUnit; 11] = [
        Self::Wei,
        Self::Kwei,
        Self::Mwei,
        Self::Gwei,
        Self::Szabo,
        Self::Finney,
        Self::Ether,
        Self::Kether,
        Self::Mether,
        Self::Gether,
        Self::Tether,
    ];

    /// Power of ten relative to WEI.
    pub fn decimals(&self) -> u32 {
        3 * (*self as u32)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wei => "wei",
            Self::Kwei => "kwei",
            Self::Mwei => "mwei",
            Self::Gwei => "gwei",
            Self::Szabo => "szabo",
            Self::Finney => "finney",
            Self::Ether => "ether",
            Self::Kether => "kether",
            Self::Mether => "mether",
            Self::Gether => "gether",
            Self::Tether => "tether",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(name))
    }
}

/// An amount of ether, stored as WEI.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ether(U256);

impl Ether {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    /// `value` expressed in `unit`, e.g. `from_number(20, Gwei)`.
    pub fn from_number(value: u64, unit: EtherUnit) -> Result<Self, NumericError> {
        U256::from_u64(value)
            .checked_mul(U256::pow10(unit.decimals())?)
            .map(Self)
    }

    /// Parse a decimal string expressed in `unit`.
    ///
    /// `"0.1"` in ETHER is 10^17 WEI; `"0.1"` in WEI is not representable and
    /// fails with `Underflow`.
    pub fn from_string(s: &str, unit: EtherUnit) -> Result<Self, NumericError> {
        U256::parse_decimal(s, unit.decimals()).map(Self)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decimal rendering in `unit`, without trailing fraction zeros.
    pub fn to_string_in(&self, unit: EtherUnit) -> String {
        self.0.to_decimal_string(unit.decimals())
    }

    pub fn checked_add(self, other: Self) -> Result<Self, NumericError> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, NumericError> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Debug for Ether {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ether({} wei)", self.0)
    }
}

impl fmt::Display for Ether {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.to_string_in(EtherUnit::Ether))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_scales_step_by_thousand() {
        assert_eq!(EtherUnit::Wei.decimals(), 0);
        assert_eq!(EtherUnit::Gwei.decimals(), 9);
        assert_eq!(EtherUnit::Ether.decimals(), 18);
        assert_eq!(EtherUnit::Tether.decimals(), 30);
    }

    #[test]
    fn fractional_wei_underflows() {
        assert_eq!(
            Ether::from_string("0.1", EtherUnit::Wei),
            Err(NumericError::Underflow)
        );
    }

    #[test]
    fn fractional_ether_parses() {
        let ether = Ether::from_string("0.1", EtherUnit::Ether).unwrap();
        assert_eq!(ether.wei().as_u64(), Some(100_000_000_000_000_000));
    }

    #[test]
    fn gwei_parse_keeps_precision() {
        let ether = Ether::from_string("12.02", EtherUnit::Gwei).unwrap();
        assert_eq!(ether.wei().as_u64(), Some(12_020_000_000));
    }

    #[test]
    fn from_number_scales() {
        let ether = Ether::from_number(20, EtherUnit::Gwei).unwrap();
        assert_eq!(ether.wei().as_u64(), Some(20_000_000_000));
    }

    #[test]
    fn renders_in_unit() {
        let ether = Ether::from_number(1_500, EtherUnit::Finney).unwrap();
        assert_eq!(ether.to_string_in(EtherUnit::Ether), "1.5");
        assert_eq!(ether.to_string(), "1.5 ETH");
        assert_eq!(ether.to_string_in(EtherUnit::Gwei), "1500000000");
    }

    #[test]
    fn subtraction_below_zero_underflows() {
        let one = Ether::from_number(1, EtherUnit::Wei).unwrap();
        assert_eq!(Ether::ZERO.checked_sub(one), Err(NumericError::Underflow));
    }

    #[test]
    fn unit_names_round_trip() {
        for unit in EtherUnit::ALL {
            assert_eq!(EtherUnit::from_name(unit.as_str()), Some(unit));
        }
        assert_eq!(EtherUnit::from_name("GWEI"), Some(EtherUnit::Gwei));
        assert_eq!(EtherUnit::from_name("dollar"), None);
    }
}
