//! Coin amounts in atomic units

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{
    read_single_i64_be_value, write_single_be_value, ByteSink, CodecError, Decode, Encode,
    ReadStream,
};

/// A non-negative number of atomic units, up to `i64::MAX`
///
/// Serialized as a decimal string in JSON so large values survive
/// consumers that parse numbers as doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coin(i64);

impl Coin {
    pub const ZERO: Coin = Coin(0);
    pub const MAX: Coin = Coin(i64::MAX);

    pub fn new(atomic_units: i64) -> Result<Self, CodecError> {
        if atomic_units < 0 {
            return Err(CodecError::NegativeAmount(atomic_units));
        }
        Ok(Coin(atomic_units))
    }

    pub fn atomic_units(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Coin) -> Option<Coin> {
        self.0.checked_add(other.0).map(Coin)
    }

    pub fn saturating_add(self, other: Coin) -> Coin {
        Coin(self.0.saturating_add(other.0))
    }

    pub fn checked_sub(self, other: Coin) -> Option<Coin> {
        self.0.checked_sub(other.0).filter(|v| *v >= 0).map(Coin)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Coin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let units: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("not a decimal integer in 0..={}: {:?}", i64::MAX, s))?;
        Coin::new(units).map_err(|e| e.to_string())
    }
}

impl TryFrom<String> for Coin {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coin> for String {
    fn from(coin: Coin) -> Self {
        coin.0.to_string()
    }
}

/// `[len: u8][trimmed big-endian units]`
impl Encode for Coin {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_be_value(out, self.0)
    }
}

impl Decode for Coin {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Coin::new(read_single_i64_be_value(stream)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_wire_form() {
        let coin = Coin::new(1000).unwrap();
        assert_eq!(coin.to_hex().unwrap(), "0203E8");
        assert_eq!(Coin::from_hex("0203E8").unwrap(), coin);
        assert_eq!(Coin::ZERO.to_hex().unwrap(), "0100");
    }

    #[test]
    fn test_non_canonical_width_is_accepted() {
        // padded to 8 bytes on the wire, written back trimmed
        let coin = Coin::from_hex("0800000000000003E8").unwrap();
        assert_eq!(coin.atomic_units(), 1000);
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(Coin::new(-5).unwrap_err(), CodecError::NegativeAmount(-5));
        assert_eq!(
            Coin::from_hex("08FFFFFFFFFFFFFFFF").unwrap_err(),
            CodecError::NegativeAmount(-1)
        );
    }

    #[test]
    fn test_decimal_string_json() {
        let coin: Coin = serde_json::from_str("\"9223372036854775807\"").unwrap();
        assert_eq!(coin.atomic_units(), i64::MAX);
        assert_eq!(serde_json::to_string(&coin).unwrap(), "\"9223372036854775807\"");
        assert!(serde_json::from_str::<Coin>("\"9223372036854775808\"").is_err());
        assert!(serde_json::from_str::<Coin>("\"-1\"").is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Coin::new(10).unwrap();
        let b = Coin::new(4).unwrap();
        assert_eq!(a.checked_sub(b).unwrap().atomic_units(), 6);
        assert!(b.checked_sub(a).is_none());
        assert!(Coin::new(i64::MAX).unwrap().checked_add(a).is_none());
        assert_eq!(Coin::MAX.saturating_add(a), Coin::MAX);
        assert_eq!(a.saturating_add(b).atomic_units(), 14);
    }
}
