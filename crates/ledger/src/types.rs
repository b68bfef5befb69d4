//! Ledger types: campaign configuration, claim requests, payouts and events.

use serde::{Deserialize, Serialize};

use dropcraft_core::{hexfmt, Address, Hash};
use dropcraft_merkle::ClaimProof;

use crate::ConfigError;

/// Default claim window (90 days)
pub const DEFAULT_CLAIM_WINDOW_SECS: u64 = 90 * 24 * 3600;

/// Immutable campaign parameters, fixed when the ledger is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Published Merkle root of the allow-list
    #[serde(with = "hexfmt::fixed")]
    pub root: Hash,
    /// Campaign start (unix seconds)
    pub start: u64,
    /// Claim window length in seconds
    pub duration_secs: u64,
    /// Identity allowed to recover unclaimed tokens after the deadline
    #[serde(with = "hexfmt::fixed")]
    pub owner: Address,
    /// Token being distributed
    #[serde(with = "hexfmt::fixed")]
    pub token: Address,
    /// Credential a claimant must hold
    #[serde(with = "hexfmt::fixed")]
    pub credential: Address,
}

impl CampaignConfig {
    /// Config with the default claim window and zeroed references.
    pub fn new(root: Hash, start: u64, owner: Address) -> Self {
        Self {
            root,
            start,
            duration_secs: DEFAULT_CLAIM_WINDOW_SECS,
            owner,
            token: [0u8; 20],
            credential: [0u8; 20],
        }
    }

    pub fn with_duration(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_token(mut self, token: Address) -> Self {
        self.token = token;
        self
    }

    pub fn with_credential(mut self, credential: Address) -> Self {
        self.credential = credential;
        self
    }

    /// Absolute deadline: `start + duration`. Claims must arrive strictly before it.
    pub fn deadline(&self) -> Result<u64, ConfigError> {
        self.start
            .checked_add(self.duration_secs)
            .ok_or(ConfigError::DeadlineOverflow {
                start: self.start,
                duration_secs: self.duration_secs,
            })
    }
}

/// A claimant's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Sibling digests from the leaf up to the root
    #[serde(with = "hexfmt::list")]
    pub proof: Vec<Hash>,
    /// Leaf the proof starts from
    #[serde(with = "hexfmt::fixed")]
    pub leaf: Hash,
    /// Claim slot
    pub index: u64,
    /// Amount granted to the slot
    #[serde(with = "hexfmt::decimal")]
    pub amount: u128,
}

impl From<&ClaimProof> for ClaimRequest {
    fn from(claim: &ClaimProof) -> Self {
        Self {
            proof: claim.proof.clone(),
            leaf: claim.leaf,
            index: claim.entry.index,
            amount: claim.entry.amount,
        }
    }
}

/// Payout authorized by a successful claim, already executed against the token ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutInstruction {
    pub recipient: Address,
    pub index: u64,
    pub amount: u128,
}

/// Append-only ledger events for auditors and indexers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A slot was claimed and paid out
    Claimed {
        #[serde(with = "hexfmt::fixed")]
        claimant: Address,
        index: u64,
        #[serde(with = "hexfmt::decimal")]
        amount: u128,
    },
    /// The owner recovered unclaimed tokens after the deadline
    Withdrawn {
        #[serde(with = "hexfmt::fixed")]
        owner: Address,
        #[serde(with = "hexfmt::decimal")]
        amount: u128,
    },
}
