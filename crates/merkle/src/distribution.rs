//! Distribution export
//!
//! The artefact a build run hands to claimants: the published root and,
//! for every allow-list entry, its leaf and proof. Once a distribution is
//! built the tree itself is no longer needed.

use serde::{Deserialize, Serialize};

use dropcraft_core::{hexfmt, Entry, Hash};

use crate::tree::{merkle_leaf, verify, MerkleTree};
use crate::{MerkleError, Result};

/// Everything a single claimant needs to submit a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProof {
    pub entry: Entry,
    #[serde(with = "hexfmt::fixed")]
    pub leaf: Hash,
    #[serde(with = "hexfmt::list")]
    pub proof: Vec<Hash>,
}

/// Merkle distribution for one campaign (ready for publishing)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Root to publish to the claim ledger
    #[serde(with = "hexfmt::fixed")]
    pub root: Hash,
    /// One record per entry, in allow-list order
    pub claims: Vec<ClaimProof>,
}

impl Distribution {
    /// Build the tree, extract a proof per entry, and drop the tree.
    pub fn build(entries: &[Entry]) -> Result<Self> {
        let tree = MerkleTree::from_entries(entries)?;
        let claims = entries
            .iter()
            .map(|entry| {
                let leaf = merkle_leaf(entry);
                let proof = tree.proof(&leaf)?;
                Ok(ClaimProof { entry: *entry, leaf, proof })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: tree.root(),
            claims,
        })
    }

    /// Look up the claim record for a slot.
    pub fn find(&self, index: u64) -> Option<&ClaimProof> {
        self.claims.iter().find(|c| c.entry.index == index)
    }

    /// Re-verify every exported proof against the root.
    ///
    /// Returns the indices of records that fail.
    pub fn audit(&self) -> Vec<u64> {
        self.claims
            .iter()
            .filter(|c| c.leaf != merkle_leaf(&c.entry) || !verify(&c.proof, &c.leaf, &self.root))
            .map(|c| c.entry.index)
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MerkleError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MerkleError::Serialization(e.to_string()))
    }
}
