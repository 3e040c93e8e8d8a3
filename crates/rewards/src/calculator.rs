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

//! Reward computation over the replayed ledger state.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    balances::weighted_balance_sum, ledger::RewardsCalculationState, units::reward_amount, Error,
    TrackingWindow,
};

/// A single account's reward, in the smallest external currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub address: Address,
    pub amount: U256,
}

/// Summary statistics for a reward computation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsSummary {
    /// Accounts with at least one balance snapshot in the window.
    pub accounts_tracked: usize,
    /// Tracked accounts that met the attestation threshold.
    pub eligible_accounts: usize,
    /// Eligible accounts with a strictly positive reward.
    pub rewarded_accounts: usize,
    /// Sum of all reward amounts.
    pub total_rewards: U256,
    /// The window the computation ran over.
    pub window: TrackingWindow,
}

/// Result of the reward computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsResult {
    /// Reward entries in ascending address order, so downstream tree
    /// construction is deterministic across runs on identical input.
    pub entries: Vec<RewardEntry>,
    pub summary: RewardsSummary,
}

/// Convert each eligible account's weighted-average balance into a reward.
///
/// Accounts without attestation eligibility are excluded regardless of
/// balance; eligible accounts whose weighted balance rounds to zero are
/// excluded as well. Runs once, after the full replay.
pub fn compute_holding_rewards(
    state: &RewardsCalculationState,
    attestation_threshold: usize,
) -> Result<RewardsResult, Error> {
    let window_blocks = state.window.len_blocks();
    let mut entries = Vec::new();
    let mut eligible_accounts = 0usize;
    let mut total_rewards = U256::ZERO;

    for (address, snapshots) in &state.snapshots {
        let issuers = state.attestations.get(address).map(|set| set.len()).unwrap_or(0);
        if issuers < attestation_threshold {
            continue;
        }
        eligible_accounts += 1;

        let weighted_sum = weighted_balance_sum(snapshots, &state.window)
            .ok_or(Error::AmountOverflow { address: *address })?;
        if weighted_sum.is_zero() {
            continue;
        }

        let amount = reward_amount(weighted_sum, state.price_factor, window_blocks)
            .ok_or(Error::AmountOverflow { address: *address })?;
        if amount.is_zero() {
            continue;
        }

        total_rewards = total_rewards
            .checked_add(amount)
            .ok_or(Error::AmountOverflow { address: *address })?;
        entries.push(RewardEntry { address: *address, amount });
    }

    let summary = RewardsSummary {
        accounts_tracked: state.snapshots.len(),
        eligible_accounts,
        rewarded_accounts: entries.len(),
        total_rewards,
        window: state.window,
    };
    tracing::info!(
        "Computed {} rewards totaling {} across {} tracked accounts ({} eligible)",
        summary.rewarded_accounts,
        summary.total_rewards,
        summary.accounts_tracked,
        summary.eligible_accounts,
    );

    Ok(RewardsResult { entries, summary })
}
