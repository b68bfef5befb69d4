//! Collaborator seams for the claim ledger.
//!
//! The ledger decides whether a claim is valid and unused. Moving tokens
//! and checking credentials belong to the host, which plugs in through
//! these traits.

use thiserror::Error;

use dropcraft_core::Address;

/// Errors reported by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Insufficient pool balance: requested {requested}, available {available}")]
    InsufficientFunds { requested: u128, available: u128 },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Fungible-asset ledger holding the campaign pool.
pub trait TokenLedger: Send + Sync {
    /// Debit the pool and credit `recipient`.
    fn transfer(&self, recipient: &Address, amount: u128) -> Result<(), TransferError>;

    /// Tokens still held by the pool.
    fn pool_balance(&self) -> u128;
}

/// External eligibility predicate ("does this identity hold credential X").
pub trait CredentialGate: Send + Sync {
    fn holds(&self, identity: &Address) -> bool;
}

impl<F> CredentialGate for F
where
    F: Fn(&Address) -> bool + Send + Sync,
{
    fn holds(&self, identity: &Address) -> bool {
        self(identity)
    }
}
