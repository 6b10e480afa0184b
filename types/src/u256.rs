//! 256-bit unsigned integer with explicit overflow reporting.
//!
//! Values are stored as four little-endian `u64` words. Nothing here wraps
//! silently: every producing operation either returns a `Result` carrying a
//! [`NumericError`] or an `(value, flag)` pair the caller must inspect.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::NumericError;

/// Largest power of ten that fits in a `u64`, used to render decimals in chunks.
const TEN_POW_19: u64 = 10_000_000_000_000_000_000;

/// A 256-bit unsigned integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    pub const MAX: Self = Self([u64::MAX; 4]);

    pub const fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    pub const fn from_u128(value: u128) -> Self {
        Self([value as u64, (value >> 64) as u64, 0, 0])
    }

    /// Build from little-endian words.
    pub const fn from_words(words: [u64; 4]) -> Self {
        Self(words)
    }

    pub fn words(&self) -> &[u64; 4] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// The value as a `u64`, if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        if self.0[1..].iter().all(|w| *w == 0) {
            Some(self.0[0])
        } else {
            None
        }
    }

    /// The value as a `u128`, if it fits.
    pub fn as_u128(&self) -> Option<u128> {
        if self.0[2..].iter().all(|w| *w == 0) {
            Some(((self.0[1] as u128) << 64) | self.0[0] as u128)
        } else {
            None
        }
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u32 {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return 64 * i as u32 + (64 - self.0[i].leading_zeros());
            }
        }
        0
    }

    // ── Byte conversions ────────────────────────────────────────────────

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            words[3 - i] = u64::from_be_bytes(word);
        }
        Self(words)
    }

    /// Parse a big-endian byte string of at most 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > 32 {
            return None;
        }
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);
        Some(Self::from_be_bytes(buf))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[i * 8..(i + 1) * 8].copy_from_slice(&self.0[3 - i].to_be_bytes());
        }
        out
    }

    /// Big-endian bytes with leading zeros stripped. Zero yields an empty vector.
    pub fn to_be_bytes_trimmed(&self) -> Vec<u8> {
        let bytes = self.to_be_bytes();
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        bytes[start..].to_vec()
    }

    // ── Arithmetic ──────────────────────────────────────────────────────

    pub fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let mut out = [0u64; 4];
        let mut carry = false;
        for (i, word) in out.iter_mut().enumerate() {
            let (sum, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            *word = sum;
            carry = c1 || c2;
        }
        (Self(out), carry)
    }

    /// Subtract, returning the two's-complement result and a "went negative" flag.
    pub fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        let mut out = [0u64; 4];
        let mut borrow = false;
        for (i, word) in out.iter_mut().enumerate() {
            let (diff, b1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (diff, b2) = diff.overflowing_sub(borrow as u64);
            *word = diff;
            borrow = b1 || b2;
        }
        (Self(out), borrow)
    }

    pub fn overflowing_mul(self, rhs: Self) -> (Self, bool) {
        let mut wide = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let cur = wide[i + j] as u128 + (self.0[i] as u128) * (rhs.0[j] as u128) + carry;
                wide[i + j] = cur as u64;
                carry = cur >> 64;
            }
            wide[i + 4] = carry as u64;
        }
        let overflow = wide[4..].iter().any(|w| *w != 0);
        (Self([wide[0], wide[1], wide[2], wide[3]]), overflow)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, NumericError> {
        match self.overflowing_add(rhs) {
            (value, false) => Ok(value),
            (_, true) => Err(NumericError::Overflow),
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, NumericError> {
        match self.overflowing_sub(rhs) {
            (value, false) => Ok(value),
            (_, true) => Err(NumericError::Underflow),
        }
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, NumericError> {
        match self.overflowing_mul(rhs) {
            (value, false) => Ok(value),
            (_, true) => Err(NumericError::Overflow),
        }
    }

    pub fn checked_mul_u64(self, rhs: u64) -> Result<Self, NumericError> {
        self.checked_mul(Self::from_u64(rhs))
    }

    /// Divide by a small divisor, returning quotient and remainder.
    ///
    /// Returns `None` when `divisor` is zero.
    pub fn checked_div_rem_u64(self, divisor: u64) -> Option<(Self, u64)> {
        if divisor == 0 {
            return None;
        }
        let divisor = divisor as u128;
        let mut out = [0u64; 4];
        let mut rem: u128 = 0;
        for i in (0..4).rev() {
            let cur = (rem << 64) | self.0[i] as u128;
            out[i] = (cur / divisor) as u64;
            rem = cur % divisor;
        }
        Some((Self(out), rem as u64))
    }

    /// `10^exp`, or `Overflow` once the power no longer fits (past `10^77`).
    pub fn pow10(exp: u32) -> Result<Self, NumericError> {
        let mut value = Self::ONE;
        for _ in 0..exp {
            value = value.checked_mul_u64(10)?;
        }
        Ok(value)
    }

    // ── Decimal and hex strings ─────────────────────────────────────────

    /// Parse a decimal string scaled by `10^decimals`.
    ///
    /// Accepts `123` and `123.456` (a trailing `.` is allowed, a leading one is
    /// not). The empty string parses as zero. Trailing zeros in the fraction are
    /// ignored; any remaining fraction digit beyond `decimals` cannot be
    /// represented and yields `Underflow`.
    pub fn parse_decimal(s: &str, decimals: u32) -> Result<Self, NumericError> {
        if s.is_empty() {
            return Ok(Self::ZERO);
        }
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(NumericError::StrangeDigits);
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > decimals as usize {
            return Err(NumericError::Underflow);
        }

        let mut value = Self::ZERO;
        for digit in whole.bytes().chain(fraction.bytes()) {
            value = value
                .checked_mul_u64(10)?
                .checked_add(Self::from_u64((digit - b'0') as u64))?;
        }
        let padding = decimals - fraction.len() as u32;
        if value.is_zero() {
            return Ok(value);
        }
        value.checked_mul(Self::pow10(padding)?)
    }

    /// Render as a decimal string with the last `decimals` digits after a `.`.
    ///
    /// Trailing fraction zeros (and a bare `.`) are omitted.
    pub fn to_decimal_string(&self, decimals: u32) -> String {
        let digits = self.to_string();
        if decimals == 0 {
            return digits;
        }
        let scale = decimals as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        }
    }

    /// Parse a hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, NumericError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(NumericError::StrangeDigits);
        }
        let s = s.trim_start_matches('0');
        if s.len() > 64 {
            return Err(NumericError::Overflow);
        }
        let even = if s.len() % 2 == 1 {
            format!("0{s}")
        } else {
            s.to_string()
        };
        let bytes = hex::decode(even).map_err(|_| NumericError::StrangeDigits)?;
        Self::from_be_slice(&bytes).ok_or(NumericError::Overflow)
    }

    /// `0x`-prefixed hex with no leading zeros (`0x0` for zero).
    pub fn to_hex(&self) -> String {
        let encoded = hex::encode(self.to_be_bytes());
        let trimmed = encoded.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for U256 {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s, 0)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chunks = Vec::new();
        let mut value = *self;
        while !value.is_zero() {
            // Divisor is a non-zero constant.
            let Some((quotient, rem)) = value.checked_div_rem_u64(TEN_POW_19) else {
                return Err(fmt::Error);
            };
            chunks.push(rem);
            value = quotient;
        }
        let Some(first) = chunks.pop() else {
            return f.write_str("0");
        };
        let mut out = first.to_string();
        for chunk in chunks.iter().rev() {
            out.push_str(&format!("{chunk:019}"));
        }
        f.write_str(&out)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_overflow() {
        let (_, overflow) = U256::MAX.overflowing_add(U256::ONE);
        assert!(overflow);
        assert_eq!(U256::MAX.checked_add(U256::ONE), Err(NumericError::Overflow));
    }

    #[test]
    fn add_carries_across_words() {
        let a = U256::from_u64(u64::MAX);
        let sum = a.checked_add(U256::ONE).unwrap();
        assert_eq!(sum.words(), &[0, 1, 0, 0]);
    }

    #[test]
    fn sub_reports_negative() {
        let (_, negative) = U256::from_u64(1).overflowing_sub(U256::from_u64(2));
        assert!(negative);
        assert_eq!(
            U256::from_u64(1).checked_sub(U256::from_u64(2)),
            Err(NumericError::Underflow)
        );
    }

    #[test]
    fn mul_detects_overflow() {
        let big = U256::from_words([0, 0, 1, 0]);
        assert_eq!(big.checked_mul(big), Err(NumericError::Overflow));
        let product = U256::from_u64(u64::MAX)
            .checked_mul(U256::from_u64(u64::MAX))
            .unwrap();
        assert_eq!(product.as_u128(), Some(u64::MAX as u128 * u64::MAX as u128));
    }

    #[test]
    fn pow10_limits() {
        assert!(U256::pow10(77).is_ok());
        assert_eq!(U256::pow10(78), Err(NumericError::Overflow));
        assert_eq!(U256::pow10(18).unwrap().as_u64(), Some(1_000_000_000_000_000_000));
    }

    #[test]
    fn parse_decimal_scales_fraction() {
        let v = U256::parse_decimal("0.1", 18).unwrap();
        assert_eq!(v.as_u64(), Some(100_000_000_000_000_000));
        let v = U256::parse_decimal("12.02", 9).unwrap();
        assert_eq!(v.as_u64(), Some(12_020_000_000));
        let v = U256::parse_decimal("5968.77", 18).unwrap();
        assert_eq!(v.to_string(), "5968770000000000000000");
    }

    #[test]
    fn parse_decimal_fraction_below_unit_underflows() {
        assert_eq!(U256::parse_decimal("0.1", 0), Err(NumericError::Underflow));
        assert_eq!(U256::parse_decimal("1.0001", 3), Err(NumericError::Underflow));
    }

    #[test]
    fn parse_decimal_ignores_trailing_zeros() {
        assert_eq!(U256::parse_decimal("1.5000", 1).unwrap().as_u64(), Some(15));
        assert_eq!(U256::parse_decimal("7.", 0).unwrap().as_u64(), Some(7));
    }

    #[test]
    fn parse_decimal_rejects_strange_digits() {
        for bad in ["1,5", ".5", "1.2.3", "-1", "1e5", " 1"] {
            assert_eq!(U256::parse_decimal(bad, 18), Err(NumericError::StrangeDigits), "{bad}");
        }
    }

    #[test]
    fn parse_decimal_empty_is_zero() {
        assert_eq!(U256::parse_decimal("", 18), Ok(U256::ZERO));
    }

    #[test]
    fn parse_decimal_overflows() {
        let huge = "1".repeat(80);
        assert_eq!(U256::parse_decimal(&huge, 0), Err(NumericError::Overflow));
        assert_eq!(U256::parse_decimal("1000", 76), Err(NumericError::Overflow));
    }

    #[test]
    fn display_renders_full_width() {
        assert_eq!(U256::ZERO.to_string(), "0");
        assert_eq!(
            U256::MAX.to_string(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn decimal_string_trims_fraction() {
        let v = U256::from_u64(1_500_000_000_000_000_000);
        assert_eq!(v.to_decimal_string(18), "1.5");
        assert_eq!(U256::from_u64(5).to_decimal_string(3), "0.005");
        assert_eq!(U256::from_u64(42000).to_decimal_string(3), "42");
        assert_eq!(U256::ZERO.to_decimal_string(18), "0");
    }

    #[test]
    fn hex_round_trip() {
        let v = U256::from_hex("0x0de0b6b3a7640000").unwrap();
        assert_eq!(v.as_u64(), Some(1_000_000_000_000_000_000));
        assert_eq!(v.to_hex(), "0xde0b6b3a7640000");
        assert_eq!(U256::ZERO.to_hex(), "0x0");
        assert_eq!(U256::from_hex("0xzz"), Err(NumericError::StrangeDigits));
    }

    #[test]
    fn trimmed_bytes_strip_leading_zeros() {
        assert!(U256::ZERO.to_be_bytes_trimmed().is_empty());
        assert_eq!(U256::from_u64(0x0400).to_be_bytes_trimmed(), vec![0x04, 0x00]);
    }

    #[test]
    fn ordering_uses_high_words_first() {
        let low = U256::from_words([u64::MAX, 0, 0, 0]);
        let high = U256::from_words([0, 0, 0, 1]);
        assert!(low < high);
    }
}
