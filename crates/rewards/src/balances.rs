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

//! Balance-by-block tracking and time-weighted averaging.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::{ledger::RewardsCalculationState, TrackingWindow};

impl RewardsCalculationState {
    /// Transition from not-tracking to tracking: snapshot every live balance
    /// at the window's start block. This captures holdings accrued before
    /// the window began, so accounts with no in-window activity still carry
    /// their balance across the whole window.
    pub(crate) fn begin_tracking(&mut self) {
        let start = self.window.start_block;
        for (address, balance) in &self.balances {
            self.snapshots.entry(*address).or_default().insert(start, *balance);
        }
        self.tracking_started = true;
        tracing::debug!(block = start, accounts = self.balances.len(), "balance tracking started");
    }

    /// Record the account's current balance at the given block. Inserting
    /// into the ordered map coalesces duplicate blocks to the latest balance,
    /// which also covers a transfer landing exactly on the start block.
    pub(crate) fn record_snapshot(&mut self, block: u64, account: Address) {
        let balance = self.balances.get(&account).copied().unwrap_or_default();
        self.snapshots.entry(account).or_default().insert(block, balance);
    }
}

/// Exact block-weighted balance sum for one account over the inclusive
/// window: each block-slot contributes the balance as of the latest snapshot
/// at or before it. Block-slots before the account's first snapshot
/// contribute zero. Returns `None` on 256-bit overflow.
///
/// Dividing by the window length is deliberately left to the caller so the
/// only rounding step happens once, at the final reward computation.
pub fn weighted_balance_sum(
    snapshots: &BTreeMap<u64, U256>,
    window: &TrackingWindow,
) -> Option<U256> {
    let mut sum = U256::ZERO;
    let mut iter = snapshots.iter().peekable();
    while let Some((&block, &balance)) = iter.next() {
        let span_end = match iter.peek() {
            Some((&next_block, _)) => next_block - 1,
            None => window.end_block,
        };
        let width = U256::from(span_end - block + 1);
        sum = sum.checked_add(balance.checked_mul(width)?)?;
    }
    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: u64, end: u64) -> TrackingWindow {
        TrackingWindow::new(start, end).unwrap()
    }

    #[test]
    fn single_snapshot_spans_rest_of_window() {
        let snaps = BTreeMap::from([(12, U256::from(100))]);
        // Blocks 12..=20 hold 100; blocks 10 and 11 hold nothing.
        assert_eq!(weighted_balance_sum(&snaps, &window(10, 20)), Some(U256::from(900)));
    }

    #[test]
    fn spans_split_at_each_snapshot() {
        let snaps = BTreeMap::from([(12, U256::from(100)), (20, U256::from(60))]);
        // 100 over blocks 12..=19, then 60 at block 20.
        assert_eq!(weighted_balance_sum(&snaps, &window(10, 20)), Some(U256::from(860)));
    }

    #[test]
    fn snapshot_at_start_covers_full_window() {
        let snaps = BTreeMap::from([(10, U256::from(7))]);
        assert_eq!(weighted_balance_sum(&snaps, &window(10, 20)), Some(U256::from(77)));
    }

    #[test]
    fn empty_snapshots_are_zero() {
        assert_eq!(weighted_balance_sum(&BTreeMap::new(), &window(10, 20)), Some(U256::ZERO));
    }

    #[test]
    fn overflow_is_reported() {
        let snaps = BTreeMap::from([(0, U256::MAX)]);
        assert_eq!(weighted_balance_sum(&snaps, &window(0, 1)), None);
    }
}
