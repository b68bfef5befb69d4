//! DropCraft Merkle
//!
//! Offline tree builder for allow-list campaigns. Builds a sorted-pair
//! Keccak Merkle tree over `(address, index, amount)` entries, exports the
//! root and per-entry proofs, and provides the pure verifier that the
//! claim ledger runs online.
//!
//! The builder and the verifier share `merkle_leaf` and `hash_pair`; the
//! ledger never sees a tree, only a root and proofs.

pub mod distribution;
pub mod tree;

pub use distribution::{ClaimProof, Distribution};
pub use tree::{hash_pair, keccak256, merkle_leaf, process_proof, verify, MerkleTree};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Cannot build a tree with no entries")]
    EmptyTree,

    #[error("Leaf not found in tree: {0}")]
    LeafNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, MerkleError>;
