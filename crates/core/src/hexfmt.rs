//! Hex rendering for addresses and digests, plus serde adapters.
//!
//! All byte values leave the system as `0x`-prefixed lowercase hex.
//! Parsing accepts the prefix optionally.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", ::hex::encode(bytes))
}

/// Decode exactly `N` bytes of hex.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let trimmed = s.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != N * 2 {
        return Err(ParseError::InvalidLength {
            expected: N,
            got: cleaned.len() / 2,
        });
    }
    let mut out = [0u8; N];
    ::hex::decode_to_slice(cleaned, &mut out).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    Ok(out)
}

/// `#[serde(with = "hexfmt::fixed")]` for `[u8; N]` fields.
pub mod fixed {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_fixed(&s).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "hexfmt::list")]` for `Vec<[u8; 32]>` fields (proofs).
pub mod list {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(items: &[[u8; 32]], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&super::to_hex(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| super::decode_fixed(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// `#[serde(with = "hexfmt::decimal")]` for token amounts.
///
/// Amounts are carried as decimal strings so that values above 2^53
/// survive JSON consumers that parse numbers as doubles.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.trim().parse().map_err(serde::de::Error::custom)
    }
}
