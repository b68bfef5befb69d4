//! DropCraft Ledger
//!
//! Online half of a Merkle allow-list campaign. Holds nothing but the
//! published root, the deadline and one claimed bit per slot.
//!
//! ## Claim Flow
//!
//! 1. **Publish**: the tree builder exports a root; a `ClaimLedger` is
//!    constructed with it and a fixed deadline (`start + duration`).
//! 2. **Claim**: a claimant submits `(proof, leaf, index, amount)`. The
//!    ledger checks the credential gate, the slot, the window and the proof,
//!    in that order, then marks the slot and pays out from the pool.
//! 3. **Recover**: after the deadline the owner may withdraw whatever the
//!    pool still holds.

mod bitmap;
mod clock;
mod ledger;
mod mock;
mod traits;
mod types;

pub use bitmap::ClaimBitmap;
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::ClaimLedger;
pub use mock::{HolderSet, InMemoryTokenPool};
pub use traits::{CredentialGate, TokenLedger, TransferError};
pub use types::*;

use thiserror::Error;

/// Reasons a claim or withdrawal is refused. None of them change ledger state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Claimant does not hold the required credential")]
    GateNotSatisfied,

    #[error("Index {0} already claimed")]
    AlreadyClaimed(u64),

    #[error("Claim window closed at {deadline} (now {now})")]
    WindowClosed { deadline: u64, now: u64 },

    #[error("Invalid Merkle proof")]
    InvalidProof,

    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Caller is not the campaign owner")]
    NotOwner,

    #[error("Claim window still open until {deadline} (now {now})")]
    WindowOpen { deadline: u64, now: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Deadline overflows: start {start} + duration {duration_secs}")]
    DeadlineOverflow { start: u64, duration_secs: u64 },
}
