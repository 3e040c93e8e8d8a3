// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Merkle tree construction and proofs.

use alloy_primitives::{keccak256, Address, B256, U256};
use merkledrop_rewards::RewardEntry;

/// Version tag of the leaf encoding scheme, recorded in the distribution
/// artifact. Bump on any change to [`encode_leaf`] or the pair-hashing rule.
pub const LEAF_ENCODING_VERSION: &str = "v1";

/// Packed leaf encoding: `uint256 index || address || uint256 amount`, all
/// big-endian fixed-width, matching the onchain claim verifier's
/// `abi.encodePacked` layout.
pub fn encode_leaf(index: u64, address: Address, amount: U256) -> [u8; 84] {
    let mut buf = [0u8; 84];
    buf[..32].copy_from_slice(&U256::from(index).to_be_bytes::<32>());
    buf[32..52].copy_from_slice(address.as_slice());
    buf[52..].copy_from_slice(&amount.to_be_bytes::<32>());
    buf
}

/// Keccak-256 hash of the encoded leaf.
pub fn leaf_hash(index: u64, address: Address, amount: U256) -> B256 {
    keccak256(encode_leaf(index, address, amount))
}

/// Hash an internal node from its children, byte-wise smaller hash first, so
/// proof verification is independent of which side a sibling sat on.
fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

/// A binary Merkle tree with all intermediate levels retained, so proofs are
/// read off without rehashing. A pure function of its input: identical
/// reward lists always produce an identical root and identical proofs.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    // levels[0] holds the leaves; the last level holds the single root.
    levels: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build the tree over an ordered reward list, assigning each entry its
    /// zero-based leaf index.
    pub fn from_entries(entries: &[RewardEntry]) -> Self {
        let leaves = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| leaf_hash(index as u64, entry.address, entry.amount))
            .collect();
        Self::from_leaves(leaves)
    }

    /// Build the tree bottom-up from pre-hashed leaves. A level of odd
    /// cardinality duplicates its last node, a deterministic padding rule
    /// the verifier side shares.
    pub fn from_leaves(leaves: Vec<B256>) -> Self {
        let mut levels = vec![leaves];
        while levels.last().map(Vec::len).unwrap_or(0) > 1 {
            let next = levels
                .last()
                .map(|level| {
                    level
                        .chunks(2)
                        .map(|pair| match pair {
                            [left, right] => hash_pair(*left, *right),
                            [odd] => hash_pair(*odd, *odd),
                            _ => unreachable!("chunks(2) yields one or two nodes"),
                        })
                        .collect()
                })
                .unwrap_or_default();
            levels.push(next);
        }
        Self { levels }
    }

    /// The number of leaves.
    pub fn len(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The root hash. An empty tree commits to the zero root.
    pub fn root(&self) -> B256 {
        self.levels.last().and_then(|level| level.first()).copied().unwrap_or(B256::ZERO)
    }

    /// The ordered sibling hashes from the indexed leaf up to the root, or
    /// `None` if the index is out of range.
    pub fn proof(&self, index: usize) -> Option<Vec<B256>> {
        if index >= self.len() {
            return None;
        }
        let mut proof = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = if position % 2 == 0 {
                // An unpaired last node is its own sibling.
                level.get(position + 1).copied().unwrap_or(level[position])
            } else {
                level[position - 1]
            };
            proof.push(sibling);
            position /= 2;
        }
        Some(proof)
    }
}

/// Fold a proof against a leaf hash with the canonical pair ordering and
/// compare to the root.
pub fn verify_proof(leaf: B256, proof: &[B256], root: B256) -> bool {
    proof.iter().fold(leaf, |node, sibling| hash_pair(node, *sibling)) == root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_encoding_layout_is_fixed_width_big_endian() {
        let address = Address::repeat_byte(0xAB);
        let encoded = encode_leaf(3, address, U256::from(0x0102u64));

        let mut expected_index = [0u8; 32];
        expected_index[31] = 3;
        assert_eq!(&encoded[..32], &expected_index);
        assert_eq!(&encoded[32..52], address.as_slice());
        assert_eq!(encoded[82], 0x01);
        assert_eq!(encoded[83], 0x02);
    }

    #[test]
    fn pair_hashing_is_order_independent() {
        let a = B256::repeat_byte(0x01);
        let b = B256::repeat_byte(0x02);
        assert_eq!(hash_pair(a, b), hash_pair(b, a));
    }

    #[test]
    fn empty_tree_has_zero_root() {
        let tree = MerkleTree::from_leaves(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.root(), B256::ZERO);
        assert_eq!(tree.proof(0), None);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = B256::repeat_byte(0x42);
        let tree = MerkleTree::from_leaves(vec![leaf]);
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.proof(0), Some(vec![]));
        assert!(verify_proof(leaf, &[], tree.root()));
    }
}
