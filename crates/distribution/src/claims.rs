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

//! The distribution artifact consumed by the onchain claim contract.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use anyhow::Context;
use merkledrop_rewards::RewardEntry;
use serde::{Deserialize, Serialize};

use crate::tree::{MerkleTree, LEAF_ENCODING_VERSION};

/// One account's claim: leaf index, amount, and the sibling hashes proving
/// membership under the published root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEntry {
    pub index: u64,
    pub amount: U256,
    pub proof: Vec<B256>,
}

/// The full distribution: root, encoding version, total, and per-address
/// claims. BTreeMap keys keep the serialized artifact byte-identical across
/// runs on identical input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionArtifact {
    pub merkle_root: B256,
    pub leaf_encoding: String,
    pub token_total: U256,
    pub claims: BTreeMap<Address, ClaimEntry>,
}

/// Build the distribution artifact over an ordered reward list.
pub fn build_distribution(entries: &[RewardEntry]) -> anyhow::Result<DistributionArtifact> {
    let tree = MerkleTree::from_entries(entries);

    let mut token_total = U256::ZERO;
    let mut claims = BTreeMap::new();
    for (index, entry) in entries.iter().enumerate() {
        token_total = token_total
            .checked_add(entry.amount)
            .context("distribution total overflows the 256-bit amount range")?;
        let proof = tree
            .proof(index)
            .with_context(|| format!("missing proof for leaf index {index}"))?;
        claims.insert(
            entry.address,
            ClaimEntry { index: index as u64, amount: entry.amount, proof },
        );
    }

    tracing::info!(
        "Built distribution tree: root {}, {} claims, token total {}",
        tree.root(),
        claims.len(),
        token_total,
    );

    Ok(DistributionArtifact {
        merkle_root: tree.root(),
        leaf_encoding: LEAF_ENCODING_VERSION.to_string(),
        token_total,
        claims,
    })
}
