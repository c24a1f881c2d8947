//! Account address type, rendered as `0x`-prefixed hex.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

type Blake2b256 = Blake2b<U32>;

/// Domain separator for campaign identity derivation.
const CAMPAIGN_DOMAIN: &[u8] = b"dfund-campaign";

/// A 20-byte account identity (creator, backer, minter, campaign escrow).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The standard prefix for the textual form.
    pub const PREFIX: &'static str = "0x";

    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Convenience constructor used by tests and simulations: every byte set to `seed`.
    pub fn repeat(seed: u8) -> Self {
        Self([seed; 20])
    }

    /// Derive the identity of the `nonce`-th campaign deployed by `deployer`.
    ///
    /// Last 20 bytes of `Blake2b-256("dfund-campaign" || deployer || nonce_be)`.
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(CAMPAIGN_DOMAIN);
        hasher.update(deployer.0);
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}…)", hex::encode(&self.0[..4]))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(s.to_string()))?;
        let bytes = hex::decode(raw).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        Ok(Self(arr))
    }
}

// Serialized in its textual form so events and scenario files stay readable.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        let addr = Address::repeat(0xab);
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("abcd".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn derive_is_deterministic_and_nonce_sensitive() {
        let factory = Address::repeat(1);
        assert_eq!(Address::derive(&factory, 0), Address::derive(&factory, 0));
        assert_ne!(Address::derive(&factory, 0), Address::derive(&factory, 1));
        assert_ne!(
            Address::derive(&factory, 0),
            Address::derive(&Address::repeat(2), 0)
        );
    }

    #[test]
    fn serde_uses_text_form() {
        let addr = Address::repeat(0x0f);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), addr);
        assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
    }
}
