//! In-memory collaborators for development and tests.
//!
//! `InMemoryTokenPool` stands in for the fungible-asset ledger and
//! `HolderSet` for the credential contract. Both keep all state in memory.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tracing::debug;

use dropcraft_core::{to_hex, Address};

use crate::traits::{CredentialGate, TokenLedger, TransferError};

#[derive(Debug, Default)]
struct PoolState {
    /// Tokens still held by the campaign pool
    pool: u128,
    /// Credited balances per recipient
    balances: HashMap<Address, u128>,
    /// Completed transfers
    transfers: u64,
}

/// A funded token pool that pays out by debiting itself.
#[derive(Debug, Default)]
pub struct InMemoryTokenPool {
    state: Mutex<PoolState>,
}

impl InMemoryTokenPool {
    pub fn new(funding: u128) -> Self {
        Self {
            state: Mutex::new(PoolState {
                pool: funding,
                ..PoolState::default()
            }),
        }
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.state.lock().balances.get(account).copied().unwrap_or(0)
    }

    pub fn transfer_count(&self) -> u64 {
        self.state.lock().transfers
    }
}

impl TokenLedger for InMemoryTokenPool {
    fn transfer(&self, recipient: &Address, amount: u128) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        if amount > state.pool {
            return Err(TransferError::InsufficientFunds {
                requested: amount,
                available: state.pool,
            });
        }
        state.pool -= amount;
        *state.balances.entry(*recipient).or_insert(0) += amount;
        state.transfers += 1;

        debug!("[MOCK] Transferred {} to {} (pool now {})", amount, to_hex(recipient), state.pool);
        Ok(())
    }

    fn pool_balance(&self) -> u128 {
        self.state.lock().pool
    }
}

/// Credential gate over a fixed set of holders.
#[derive(Debug, Clone, Default)]
pub struct HolderSet {
    holders: HashSet<Address>,
}

impl HolderSet {
    pub fn new(holders: impl IntoIterator<Item = Address>) -> Self {
        Self {
            holders: holders.into_iter().collect(),
        }
    }
}

impl CredentialGate for HolderSet {
    fn holds(&self, identity: &Address) -> bool {
        self.holders.contains(identity)
    }
}
