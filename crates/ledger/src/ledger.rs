//! Claim ledger
//!
//! Holds the published root, the claim deadline and the claimed-slot
//! bitmap for one campaign. A claim passes four checks, in this order:
//!
//! 1. the claimant holds the required credential
//! 2. the slot has not been claimed
//! 3. the window is still open (`now < deadline`)
//! 4. the leaf matches `(claimant, index, amount)` and the proof folds to the root
//!
//! Only then is the slot marked and the token transfer executed. Marking
//! and payout happen under one lock; a failed or panicking transfer clears
//! the slot again before the lock is released, so no slot is ever observed
//! as claimed without a payout, and no slot pays out twice.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use dropcraft_core::{to_hex, Address, Entry, Hash};
use dropcraft_merkle::{merkle_leaf, verify};

use crate::bitmap::ClaimBitmap;
use crate::clock::Clock;
use crate::traits::{CredentialGate, TokenLedger};
use crate::types::{CampaignConfig, ClaimRequest, LedgerEvent, PayoutInstruction};
use crate::{ClaimError, ConfigError};

#[derive(Debug, Default)]
struct LedgerState {
    claimed: ClaimBitmap,
    events: Vec<LedgerEvent>,
}

/// Marks a slot claimed and clears it again on drop unless committed.
///
/// Covers both a transfer error and a panic unwinding out of the transfer.
struct SlotGuard<'a> {
    claimed: &'a mut ClaimBitmap,
    index: u64,
    committed: bool,
}

impl<'a> SlotGuard<'a> {
    fn mark(claimed: &'a mut ClaimBitmap, index: u64) -> Self {
        claimed.set(index);
        Self { claimed, index, committed: false }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.claimed.unset(self.index);
        }
    }
}

/// Per-campaign claim ledger.
pub struct ClaimLedger {
    config: CampaignConfig,
    deadline: u64,
    token: Arc<dyn TokenLedger>,
    gate: Arc<dyn CredentialGate>,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
}

impl ClaimLedger {
    pub fn new(
        config: CampaignConfig,
        token: Arc<dyn TokenLedger>,
        gate: Arc<dyn CredentialGate>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let deadline = config.deadline()?;
        info!(
            "Campaign opened: root {} deadline {} owner {}",
            to_hex(&config.root),
            deadline,
            to_hex(&config.owner),
        );
        Ok(Self {
            config,
            deadline,
            token,
            gate,
            clock,
            state: Mutex::new(LedgerState::default()),
        })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// The published root.
    pub fn root(&self) -> Hash {
        self.config.root
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        self.state.lock().claimed.is_set(index)
    }

    pub fn claimed_count(&self) -> usize {
        self.state.lock().claimed.count()
    }

    /// Snapshot of all events emitted so far, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().events.clone()
    }

    /// Claim the slot described by `request` on behalf of `claimant`.
    ///
    /// On success the transfer has already been executed and the returned
    /// instruction is the receipt. Every error leaves the ledger unchanged.
    pub fn claim(
        &self,
        request: &ClaimRequest,
        claimant: &Address,
    ) -> Result<PayoutInstruction, ClaimError> {
        if !self.gate.holds(claimant) {
            debug!("Claim by {} rejected: credential not held", to_hex(claimant));
            return Err(ClaimError::GateNotSatisfied);
        }

        let mut state = self.state.lock();

        if state.claimed.is_set(request.index) {
            debug!("Claim by {} rejected: index {} already claimed", to_hex(claimant), request.index);
            return Err(ClaimError::AlreadyClaimed(request.index));
        }

        let now = self.clock.now();
        if now >= self.deadline {
            debug!("Claim by {} rejected: window closed at {} (now {})", to_hex(claimant), self.deadline, now);
            return Err(ClaimError::WindowClosed { deadline: self.deadline, now });
        }

        // Bind the leaf to the caller so a proven leaf cannot be claimed by someone else
        let expected = merkle_leaf(&Entry::new(*claimant, request.index, request.amount));
        if request.leaf != expected || !verify(&request.proof, &request.leaf, &self.config.root) {
            debug!("Claim by {} rejected: invalid proof for index {}", to_hex(claimant), request.index);
            return Err(ClaimError::InvalidProof);
        }

        let slot = SlotGuard::mark(&mut state.claimed, request.index);
        if let Err(e) = self.token.transfer(claimant, request.amount) {
            drop(slot);
            debug!("Claim by {} rolled back: {}", to_hex(claimant), e);
            return Err(ClaimError::TransferFailed(e));
        }
        slot.commit();

        state.events.push(LedgerEvent::Claimed {
            claimant: *claimant,
            index: request.index,
            amount: request.amount,
        });

        info!(
            "Index {} claimed by {}: {} tokens",
            request.index,
            to_hex(claimant),
            request.amount,
        );

        Ok(PayoutInstruction {
            recipient: *claimant,
            index: request.index,
            amount: request.amount,
        })
    }

    /// Move whatever is left in the pool to the owner once the window has closed.
    ///
    /// Returns the amount recovered (zero if the pool is already empty).
    pub fn withdraw_unclaimed(&self, caller: &Address) -> Result<u128, ClaimError> {
        if *caller != self.config.owner {
            return Err(ClaimError::NotOwner);
        }

        let mut state = self.state.lock();

        let now = self.clock.now();
        if now < self.deadline {
            return Err(ClaimError::WindowOpen { deadline: self.deadline, now });
        }

        let amount = self.token.pool_balance();
        if amount > 0 {
            self.token.transfer(caller, amount)?;
        }
        state.events.push(LedgerEvent::Withdrawn { owner: *caller, amount });

        info!("Owner {} recovered {} unclaimed tokens", to_hex(caller), amount);
        Ok(amount)
    }
}
