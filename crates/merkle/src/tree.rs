//! Sorted-pair binary Merkle tree over allow-list entries.
//!
//! Leaf formula: `KECCAK256(address || be32(index) || be32(amount))`.
//! Internal nodes: `KECCAK256(min(a, b) || max(a, b))`, comparing raw digest bytes.
//! Leaves are sorted by digest before assembly, so the root depends only on
//! the set of entries. On a level with an odd node count the last node is
//! promoted unchanged and contributes no sibling to proofs at that level.

use sha3::{Digest, Keccak256};
use tracing::info;

use dropcraft_core::{to_hex, Entry, Hash};

use crate::{MerkleError, Result};

/// Single-pass Keccak-256.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Compute the leaf digest for an allow-list entry.
///
/// This formula MUST match whatever verifier the root is published to.
/// Any divergence in packing silently invalidates every proof.
pub fn merkle_leaf(entry: &Entry) -> Hash {
    keccak256(&entry.encode())
}

/// Hash two nodes into their parent, smaller digest first.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(first)
        .chain_update(second)
        .finalize()
        .into()
}

/// Fold a proof into a leaf, returning the implied root.
pub fn process_proof(proof: &[Hash], leaf: &Hash) -> Hash {
    proof
        .iter()
        .fold(*leaf, |computed, sibling| hash_pair(&computed, sibling))
}

/// Check that `leaf` is committed to by `root`.
///
/// Needs nothing but the three inputs; this is the whole online verifier.
pub fn verify(proof: &[Hash], leaf: &Hash, root: &Hash) -> bool {
    process_proof(proof, leaf) == *root
}

/// A binary Merkle tree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes stored level by level, bottom-up. `layers[0]` = sorted leaves.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from allow-list entries.
    pub fn from_entries(entries: &[Entry]) -> Result<Self> {
        let leaves = entries.iter().map(merkle_leaf).collect();
        Self::from_leaves(leaves)
    }

    /// Build a tree from pre-hashed leaves.
    ///
    /// Fails with `EmptyTree` when there is nothing to commit to.
    pub fn from_leaves(mut leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        leaves.sort_unstable();
        let mut layers = vec![leaves];

        loop {
            let prev = &layers[layers.len() - 1];
            if prev.len() <= 1 {
                break;
            }
            let next_layer: Vec<Hash> = prev
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    // Odd count: promote the last node unchanged
                    _ => pair[0],
                })
                .collect();
            layers.push(next_layer);
        }

        let tree = Self { layers };
        info!(
            "Built Merkle tree: {} leaves, depth {}, root {}",
            tree.leaf_count(),
            tree.depth(),
            to_hex(&tree.root()),
        );
        Ok(tree)
    }

    /// Get the Merkle root.
    pub fn root(&self) -> Hash {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of leaves (duplicates included, no padding).
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn contains(&self, leaf: &Hash) -> bool {
        self.layers[0].binary_search(leaf).is_ok()
    }

    /// Sibling digests from `leaf` up to the root (bottom-up).
    pub fn proof(&self, leaf: &Hash) -> Result<Vec<Hash>> {
        let mut idx = self.layers[0]
            .binary_search(leaf)
            .map_err(|_| MerkleError::LeafNotFound(to_hex(leaf)))?;

        let mut siblings = Vec::with_capacity(self.depth());
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_idx = idx ^ 1;
            // A promoted node has no sibling on this level
            if let Some(sibling) = layer.get(sibling_idx) {
                siblings.push(*sibling);
            }
            idx /= 2;
        }

        Ok(siblings)
    }

    /// Proof for the leaf derived from `entry`.
    pub fn proof_for_entry(&self, entry: &Entry) -> Result<Vec<Hash>> {
        self.proof(&merkle_leaf(entry))
    }
}
