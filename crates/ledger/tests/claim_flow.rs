//! Claim flow integration tests
//!
//! Covers the full campaign pipeline:
//! 1. allow-list text → distribution (root + proofs)
//! 2. distribution → ledger claims
//! 3. at-most-once payout under concurrent submission
//! 4. window and gate enforcement with otherwise valid proofs
//! 5. slot release when the token transfer panics

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use dropcraft_core::{read_allow_list, Address, Entry};
use dropcraft_ledger::{
    CampaignConfig, ClaimError, ClaimLedger, ClaimRequest, HolderSet, InMemoryTokenPool,
    LedgerEvent, ManualClock, PayoutInstruction, TokenLedger, TransferError,
};
use dropcraft_merkle::{hash_pair, merkle_leaf, Distribution, MerkleTree};

const START: u64 = 1_700_000_000;
const WINDOW: u64 = 30 * 24 * 3600;
const OWNER: Address = [0xEE; 20];

fn addr(seed: u8) -> Address {
    [seed; 20]
}

fn open_ledger(
    dist: &Distribution,
    funding: u128,
    holders: Vec<Address>,
) -> (ClaimLedger, Arc<InMemoryTokenPool>, Arc<ManualClock>) {
    dropcraft_logging::init_for_tests();

    let pool = Arc::new(InMemoryTokenPool::new(funding));
    let clock = Arc::new(ManualClock::new(START));
    let config = CampaignConfig::new(dist.root, START, OWNER)
        .with_duration(WINDOW)
        .with_token(addr(0x70))
        .with_credential(addr(0xC0));
    let ledger = ClaimLedger::new(
        config,
        pool.clone(),
        Arc::new(HolderSet::new(holders)),
        clock.clone(),
    )
    .unwrap();
    (ledger, pool, clock)
}

// ============================================================================
// 1. Three-entry scenario
// ============================================================================

#[test]
fn test_three_entry_scenario() {
    let (a, b, c) = (addr(0xA0), addr(0xB0), addr(0xC0));
    let entries = [Entry::new(a, 0, 10), Entry::new(b, 1, 20), Entry::new(c, 2, 30)];

    let l0 = merkle_leaf(&entries[0]);
    let l1 = merkle_leaf(&entries[1]);
    let l2 = merkle_leaf(&entries[2]);

    // Sorted leaves: the first two pair up, the third is promoted
    let mut sorted = [l0, l1, l2];
    sorted.sort();
    let expected_root = hash_pair(&hash_pair(&sorted[0], &sorted[1]), &sorted[2]);

    let tree = MerkleTree::from_entries(&entries).unwrap();
    assert_eq!(tree.root(), expected_root);

    let dist = Distribution::build(&entries).unwrap();
    assert_eq!(dist.root, expected_root);

    let (ledger, pool, _clock) = open_ledger(&dist, 60, vec![b]);
    let request = ClaimRequest {
        proof: tree.proof(&l1).unwrap(),
        leaf: l1,
        index: 1,
        amount: 20,
    };

    let payout = ledger.claim(&request, &b).unwrap();
    assert_eq!(payout, PayoutInstruction { recipient: b, index: 1, amount: 20 });
    assert_eq!(pool.balance_of(&b), 20);

    let again = ledger.claim(&request, &b);
    assert!(matches!(again, Err(ClaimError::AlreadyClaimed(1))));
    assert_eq!(pool.balance_of(&b), 20);
    assert_eq!(
        ledger.events(),
        vec![LedgerEvent::Claimed { claimant: b, index: 1, amount: 20 }],
    );
}

// ============================================================================
// 2. Allow-list ingestion through to claims
// ============================================================================

#[test]
fn test_allow_list_to_claims() {
    let text = "\
address,index,amount
0x1111111111111111111111111111111111111111,4,100
0x2222222222222222222222222222222222222222,9
0x3333333333333333333333333333333333333333,2,300
0x4444444444444444444444444444444444444444;17;400
";
    let report = read_allow_list(Cursor::new(text)).unwrap();
    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.skipped, 2);

    let dist = Distribution::build(&report.entries).unwrap();
    let holders = report.entries.iter().map(|e| e.address).collect();
    let (ledger, pool, _clock) = open_ledger(&dist, 800, holders);

    for claim in &dist.claims {
        ledger.claim(&ClaimRequest::from(claim), &claim.entry.address).unwrap();
    }

    assert_eq!(ledger.claimed_count(), 3);
    assert!(ledger.is_claimed(4));
    assert!(ledger.is_claimed(17));
    assert!(!ledger.is_claimed(9));
    assert_eq!(pool.pool_balance(), 0);
    assert_eq!(pool.balance_of(&addr(0x33)), 300);
}

// ============================================================================
// 3. At-most-once under concurrency
// ============================================================================

#[test]
fn test_concurrent_claims_pay_once() {
    let claimant = addr(0x42);
    let entries: Vec<Entry> = (0..16u8)
        .map(|i| Entry::new(if i == 5 { claimant } else { addr(i) }, i as u64, 1_000))
        .collect();
    let dist = Distribution::build(&entries).unwrap();
    let (ledger, pool, _clock) = open_ledger(&dist, 16_000, vec![claimant]);
    let request = ClaimRequest::from(dist.find(5).unwrap());

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| ledger.claim(&request, &claimant)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(ClaimError::AlreadyClaimed(5))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(pool.balance_of(&claimant), 1_000);
    assert_eq!(pool.transfer_count(), 1);
    assert_eq!(ledger.events().len(), 1);
}

#[test]
fn test_concurrent_distinct_slots_all_pay() {
    let entries: Vec<Entry> = (0..32u8).map(|i| Entry::new(addr(i), i as u64, 10)).collect();
    let dist = Distribution::build(&entries).unwrap();
    let holders = entries.iter().map(|e| e.address).collect();
    let (ledger, pool, _clock) = open_ledger(&dist, 320, holders);

    thread::scope(|s| {
        for claim in &dist.claims {
            let ledger = &ledger;
            s.spawn(move || {
                ledger
                    .claim(&ClaimRequest::from(claim), &claim.entry.address)
                    .unwrap();
            });
        }
    });

    assert_eq!(ledger.claimed_count(), 32);
    assert_eq!(pool.pool_balance(), 0);
}

// ============================================================================
// 4. Window and gate enforcement
// ============================================================================

#[test]
fn test_window_enforced_with_valid_proof() {
    let entries = [Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)];
    let dist = Distribution::build(&entries).unwrap();
    let (ledger, _pool, clock) = open_ledger(&dist, 30, vec![addr(1), addr(2)]);
    assert_eq!(ledger.deadline(), START + WINDOW);

    for late in [START + WINDOW, START + WINDOW + 1, u64::MAX] {
        clock.set(late);
        let result = ledger.claim(&ClaimRequest::from(dist.find(1).unwrap()), &addr(2));
        assert!(matches!(result, Err(ClaimError::WindowClosed { .. })));
    }
    assert_eq!(ledger.claimed_count(), 0);

    clock.set(START);
    ledger.claim(&ClaimRequest::from(dist.find(1).unwrap()), &addr(2)).unwrap();
}

#[test]
fn test_gate_enforced_with_valid_proof() {
    let entries = [Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)];
    let dist = Distribution::build(&entries).unwrap();
    let (ledger, pool, _clock) = open_ledger(&dist, 30, vec![addr(1)]);

    let result = ledger.claim(&ClaimRequest::from(dist.find(1).unwrap()), &addr(2));
    assert!(matches!(result, Err(ClaimError::GateNotSatisfied)));
    assert!(!ledger.is_claimed(1));
    assert_eq!(pool.transfer_count(), 0);
}

#[test]
fn test_closure_gate() {
    let entries = [Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)];
    let dist = Distribution::build(&entries).unwrap();
    let pool = Arc::new(InMemoryTokenPool::new(30));
    let gate = |identity: &Address| identity[0] % 2 == 0;
    let ledger = ClaimLedger::new(
        CampaignConfig::new(dist.root, START, OWNER),
        pool,
        Arc::new(gate),
        Arc::new(ManualClock::new(START)),
    )
    .unwrap();

    assert!(matches!(
        ledger.claim(&ClaimRequest::from(dist.find(0).unwrap()), &addr(1)),
        Err(ClaimError::GateNotSatisfied)
    ));
    ledger.claim(&ClaimRequest::from(dist.find(1).unwrap()), &addr(2)).unwrap();
}

#[test]
fn test_proof_for_other_root_rejected() {
    let first = Distribution::build(&[Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)]).unwrap();
    let second = Distribution::build(&[Entry::new(addr(1), 0, 10), Entry::new(addr(3), 1, 20)]).unwrap();
    let (ledger, _pool, _clock) = open_ledger(&first, 30, vec![addr(1)]);

    // Same entry, but its proof commits to a different tree
    let result = ledger.claim(&ClaimRequest::from(second.find(0).unwrap()), &addr(1));
    assert!(matches!(result, Err(ClaimError::InvalidProof)));
}

#[test]
fn test_owner_recovers_after_deadline() {
    let entries = [Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)];
    let dist = Distribution::build(&entries).unwrap();
    let (ledger, pool, clock) = open_ledger(&dist, 30, vec![addr(1), addr(2)]);

    ledger.claim(&ClaimRequest::from(dist.find(0).unwrap()), &addr(1)).unwrap();
    assert!(matches!(ledger.withdraw_unclaimed(&OWNER), Err(ClaimError::WindowOpen { .. })));

    clock.advance(WINDOW);
    assert_eq!(ledger.withdraw_unclaimed(&OWNER).unwrap(), 20);
    assert_eq!(pool.balance_of(&OWNER), 20);

    let late = ledger.claim(&ClaimRequest::from(dist.find(1).unwrap()), &addr(2));
    assert!(matches!(late, Err(ClaimError::WindowClosed { .. })));
}

// ============================================================================
// 5. Transfer panics
// ============================================================================

/// Token ledger whose first transfer panics; later transfers go through.
struct PanicOnceLedger {
    inner: InMemoryTokenPool,
    tripped: AtomicBool,
}

impl TokenLedger for PanicOnceLedger {
    fn transfer(&self, recipient: &Address, amount: u128) -> Result<(), TransferError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("token backend crashed");
        }
        self.inner.transfer(recipient, amount)
    }

    fn pool_balance(&self) -> u128 {
        self.inner.pool_balance()
    }
}

#[test]
fn test_panicking_transfer_releases_slot() {
    dropcraft_logging::init_for_tests();

    let entries = [Entry::new(addr(1), 0, 10), Entry::new(addr(2), 1, 20)];
    let dist = Distribution::build(&entries).unwrap();
    let token = Arc::new(PanicOnceLedger {
        inner: InMemoryTokenPool::new(30),
        tripped: AtomicBool::new(false),
    });
    let ledger = ClaimLedger::new(
        CampaignConfig::new(dist.root, START, OWNER),
        token.clone(),
        Arc::new(HolderSet::new(vec![addr(2)])),
        Arc::new(ManualClock::new(START)),
    )
    .unwrap();
    let request = ClaimRequest::from(dist.find(1).unwrap());

    let crashed = panic::catch_unwind(AssertUnwindSafe(|| ledger.claim(&request, &addr(2))));
    assert!(crashed.is_err());
    assert!(!ledger.is_claimed(1));
    assert_eq!(ledger.claimed_count(), 0);
    assert!(ledger.events().is_empty());

    let payout = ledger.claim(&request, &addr(2)).unwrap();
    assert_eq!(payout.amount, 20);
    assert!(ledger.is_claimed(1));
    assert_eq!(token.inner.balance_of(&addr(2)), 20);
    assert_eq!(token.inner.transfer_count(), 1);
    assert_eq!(ledger.events().len(), 1);
}
