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

//! The event ledger state machine.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{ChainEvent, Error, OrderedEvent, TrackingWindow};

/// The aggregate state threaded through the whole replay.
///
/// Created once, mutated monotonically while events are applied (never rolled
/// back), and serialized after processing completes as an audit artifact.
/// There is exactly one writer; replay order is semantically load-bearing.
/// All maps are ordered so the serialized artifact is byte-identical across
/// runs on identical input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsCalculationState {
    /// Identifier address -> wallet address credit is redirected to.
    /// Last write wins per identifier.
    pub wallet_associations: BTreeMap<Address, Address>,
    /// Account -> set of issuer addresses that completed an attestation for
    /// it. Issuer sets only grow.
    pub attestations: BTreeMap<Address, BTreeSet<Address>>,
    /// Live balances in the token's smallest unit.
    pub balances: BTreeMap<Address, U256>,
    /// Per-account balance snapshots, block -> balance, restricted to the
    /// tracking window. Duplicate blocks coalesce to the latest balance.
    pub snapshots: BTreeMap<Address, BTreeMap<u64, U256>>,
    /// The inclusive block range balances are averaged over.
    pub window: TrackingWindow,
    /// Whether the balance tracker has taken its initial snapshot.
    pub tracking_started: bool,
    /// Price factor in external currency units per smallest native unit,
    /// 18-decimal fixed point.
    pub price_factor: U256,
}

impl RewardsCalculationState {
    pub fn new(window: TrackingWindow, price_factor: U256) -> Self {
        Self {
            wallet_associations: BTreeMap::new(),
            attestations: BTreeMap::new(),
            balances: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            window,
            tracking_started: false,
            price_factor,
        }
    }

    /// Resolve an address through the current wallet association, if any.
    pub fn resolve(&self, address: Address) -> Address {
        self.wallet_associations.get(&address).copied().unwrap_or(address)
    }

    /// Record or overwrite the wallet association for an identifier.
    /// Associations apply strictly in event order and never retroactively
    /// reassign credit already applied.
    pub fn apply_wallet_address_set(&mut self, account: Address, wallet: Address) {
        self.wallet_associations.insert(account, wallet);
    }

    /// Credit an attestation completion to the account, resolved through the
    /// wallet association as of application time. Re-completions by the same
    /// issuer are no-ops.
    pub fn apply_attestation_completed(&mut self, account: Address, issuer: Address) {
        let credited = self.resolve(account);
        self.attestations.entry(credited).or_default().insert(issuer);
    }

    /// Apply a transfer: debit the resolved sender, credit the resolved
    /// receiver. The zero address mints as sender and burns as receiver.
    /// While the tracker is live, snapshots are recorded for the touched
    /// accounts.
    pub fn apply_transfer(
        &mut self,
        block: u64,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), Error> {
        let from = self.resolve(from);
        let to = self.resolve(to);

        if from != Address::ZERO {
            let balance = self.balances.entry(from).or_default();
            if *balance < value {
                return Err(Error::InvalidTransfer {
                    address: from,
                    block,
                    amount: value,
                    balance: *balance,
                });
            }
            *balance -= value;
        }
        if to != Address::ZERO {
            *self.balances.entry(to).or_default() += value;
        }

        if self.tracking_started && self.window.contains(block) {
            if from != Address::ZERO {
                self.record_snapshot(block, from);
            }
            if to != Address::ZERO {
                self.record_snapshot(block, to);
            }
        }
        Ok(())
    }

    /// Replay a full ordered event stream in two explicit phases.
    ///
    /// Phase 1 applies every wallet-association and attestation event, since
    /// attestation eligibility is a final state independent of balance
    /// history. Phase 2 then applies transfers, feeding the balance tracker.
    /// Inverting the phases changes results: associations must be resolved
    /// before they redirect balance credit.
    ///
    /// Events are assumed to be in global chronological order (caller
    /// guarantee); the core does not verify it.
    pub fn replay(&mut self, events: &[OrderedEvent]) -> Result<(), Error> {
        for ev in events {
            match &ev.event {
                ChainEvent::WalletAddressSet { account, wallet } => {
                    self.apply_wallet_address_set(*account, *wallet)
                }
                ChainEvent::AttestationCompleted { account, issuer } => {
                    self.apply_attestation_completed(*account, *issuer)
                }
                ChainEvent::Transfer { .. } => {}
            }
        }
        tracing::debug!(
            associations = self.wallet_associations.len(),
            attested_accounts = self.attestations.len(),
            "identity replay complete"
        );

        for ev in events {
            let ChainEvent::Transfer { from, to, value } = &ev.event else {
                continue;
            };
            if !self.tracking_started && ev.block_number >= self.window.start_block {
                self.begin_tracking();
            }
            if ev.block_number > self.window.end_block {
                // The tracker is terminal: remaining transfers are not applied.
                tracing::debug!(block = ev.block_number, "transfer past window end, halting replay");
                break;
            }
            self.apply_transfer(ev.block_number, *from, *to, *value)?;
        }
        tracing::debug!(
            accounts = self.balances.len(),
            snapshotted = self.snapshots.len(),
            "transfer replay complete"
        );
        Ok(())
    }
}
