use serde::{Deserialize, Serialize};

use crate::hexfmt::{self, ParseError};

/// 20-byte account identity
pub type Address = [u8; 20];

/// 32-byte Keccak-256 digest (leaves, internal nodes and roots)
pub type Hash = [u8; 32];

/// One allow-list row: who may claim, which slot, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Recipient identity
    #[serde(with = "hexfmt::fixed")]
    pub address: Address,
    /// Claim slot, unique per campaign
    pub index: u64,
    /// Token units granted to this slot
    #[serde(with = "hexfmt::decimal")]
    pub amount: u128,
}

impl Entry {
    pub fn new(address: Address, index: u64, amount: u128) -> Self {
        Self { address, index, amount }
    }

    /// Canonical leaf preimage: `address ∥ be32(index) ∥ be32(amount)`.
    ///
    /// Integers are left-padded with zeroes to 32 bytes, matching the
    /// tight packing an EVM verifier would produce for `(address, uint256, uint256)`.
    pub fn encode(&self) -> [u8; 84] {
        let mut out = [0u8; 84];
        out[..20].copy_from_slice(&self.address);
        out[20 + 24..52].copy_from_slice(&self.index.to_be_bytes());
        out[52 + 16..].copy_from_slice(&self.amount.to_be_bytes());
        out
    }
}

/// Parse a 20-byte address from hex, with or without `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, ParseError> {
    hexfmt::decode_fixed(s)
}

/// Parse a 32-byte digest from hex, with or without `0x` prefix.
pub fn parse_hash(s: &str) -> Result<Hash, ParseError> {
    hexfmt::decode_fixed(s)
}
