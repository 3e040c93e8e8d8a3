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

use alloy_primitives::{Address, U256};
use merkledrop_distribution::{build_distribution, leaf_hash, verify_proof, MerkleTree};
use merkledrop_rewards::RewardEntry;

fn entries(count: usize) -> Vec<RewardEntry> {
    (0..count)
        .map(|i| RewardEntry {
            address: Address::repeat_byte(i as u8 + 1),
            amount: U256::from((i as u64 + 1) * 1000),
        })
        .collect()
}

#[test]
fn every_proof_reconstructs_the_root() {
    // Cover even, odd, and power-of-two leaf counts.
    for count in [1usize, 2, 3, 4, 5, 7, 8, 16] {
        let rewards = entries(count);
        let tree = MerkleTree::from_entries(&rewards);
        let root = tree.root();
        for (index, entry) in rewards.iter().enumerate() {
            let leaf = leaf_hash(index as u64, entry.address, entry.amount);
            let proof = tree.proof(index).unwrap();
            assert!(
                verify_proof(leaf, &proof, root),
                "proof for leaf {index} of {count} failed"
            );
        }
    }
}

#[test]
fn identical_input_yields_identical_trees() {
    let rewards = entries(9);
    let first = MerkleTree::from_entries(&rewards);
    let second = MerkleTree::from_entries(&rewards);
    assert_eq!(first.root(), second.root());
    for index in 0..rewards.len() {
        assert_eq!(first.proof(index), second.proof(index));
    }
}

#[test]
fn mutating_any_amount_changes_the_root() {
    let rewards = entries(6);
    let original = MerkleTree::from_entries(&rewards).root();

    for index in 0..rewards.len() {
        let mut tampered = rewards.clone();
        tampered[index].amount += U256::from(1);
        let root = MerkleTree::from_entries(&tampered).root();
        assert_ne!(root, original, "tampering with entry {index} went undetected");
    }
}

#[test]
fn reordering_entries_changes_the_root() {
    // Leaf indices are part of the encoding, so order is committed to.
    let rewards = entries(4);
    let mut swapped = rewards.clone();
    swapped.swap(1, 2);
    assert_ne!(
        MerkleTree::from_entries(&rewards).root(),
        MerkleTree::from_entries(&swapped).root()
    );
}

#[test]
fn distribution_artifact_is_coherent() {
    let rewards = entries(5);
    let artifact = build_distribution(&rewards).unwrap();

    assert_eq!(artifact.leaf_encoding, "v1");
    assert_eq!(artifact.claims.len(), rewards.len());
    assert_eq!(artifact.token_total, U256::from((1 + 2 + 3 + 4 + 5) * 1000u64));

    for (index, entry) in rewards.iter().enumerate() {
        let claim = artifact.claims.get(&entry.address).unwrap();
        assert_eq!(claim.index, index as u64);
        assert_eq!(claim.amount, entry.amount);
        let leaf = leaf_hash(claim.index, entry.address, claim.amount);
        assert!(verify_proof(leaf, &claim.proof, artifact.merkle_root));
    }
}

#[test]
fn empty_reward_set_produces_zero_root_and_no_claims() {
    let artifact = build_distribution(&[]).unwrap();
    assert_eq!(artifact.merkle_root, alloy_primitives::B256::ZERO);
    assert!(artifact.claims.is_empty());
    assert_eq!(artifact.token_total, U256::ZERO);
}

#[test]
fn artifact_serialization_is_deterministic() {
    let rewards = entries(7);
    let first = serde_json::to_string(&build_distribution(&rewards).unwrap()).unwrap();
    let second = serde_json::to_string(&build_distribution(&rewards).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn proof_against_wrong_root_fails() {
    let rewards = entries(4);
    let tree = MerkleTree::from_entries(&rewards);
    let leaf = leaf_hash(0, rewards[0].address, rewards[0].amount);
    let proof = tree.proof(0).unwrap();
    let wrong_root = alloy_primitives::B256::repeat_byte(0xFF);
    assert!(!verify_proof(leaf, &proof, wrong_root));
}
