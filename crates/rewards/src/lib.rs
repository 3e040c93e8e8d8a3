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

//! Event replay and reward computation for attestation-gated holding rewards.
//!
//! The crate consumes pre-extracted blockchain event logs, reconstructs
//! per-account state over a fixed block window, and produces the reward set
//! that the distribution tree is built over. Replay is strictly sequential
//! and two-phased: the full attestation/wallet-association stream is applied
//! before any transfer, since associations redirect where later credit lands.

// Declare modules
pub mod balances;
pub mod calculator;
pub mod events;
pub mod ledger;
pub mod units;

// Re-export commonly used types
pub use balances::weighted_balance_sum;

pub use calculator::{compute_holding_rewards, RewardEntry, RewardsResult, RewardsSummary};

pub use events::{decode_events, ChainEvent, OrderedEvent, RawEvent};

pub use ledger::RewardsCalculationState;

pub use units::{mul_div_half_up, parse_price, reward_amount, PRICE_DECIMALS};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Number of distinct attestation issuers an account needs before it is
/// eligible for rewards. Overridable per run.
pub const DEFAULT_ATTESTATION_THRESHOLD: usize = 3;

/// Inclusive block range over which balances are averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingWindow {
    pub start_block: u64,
    pub end_block: u64,
}

impl TrackingWindow {
    /// Create a window, rejecting bounds where the end precedes the start.
    pub fn new(start_block: u64, end_block: u64) -> Result<Self, Error> {
        if end_block < start_block {
            return Err(Error::Configuration { start_block, end_block });
        }
        Ok(Self { start_block, end_block })
    }

    /// Window length in block-slots. Both bounds are inclusive.
    pub fn len_blocks(&self) -> u64 {
        self.end_block - self.start_block + 1
    }

    pub fn contains(&self, block: u64) -> bool {
        block >= self.start_block && block <= self.end_block
    }
}

/// Errors surfaced by event decoding and replay.
///
/// All of these are fatal to the run: the input event set is static, so
/// retrying without fixing the input is never meaningful. A distribution-root
/// mismatch is deliberately not represented here; it is an expected possible
/// outcome reported as a value, not a processing failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tracking window bounds are contradictory.
    #[error("invalid tracking window: end block {end_block} precedes start block {start_block}")]
    Configuration { start_block: u64, end_block: u64 },

    /// An event of a type this pipeline does not recognize. Partial
    /// processing would silently corrupt the reward computation, so the whole
    /// run is rejected.
    #[error("unknown event type `{name}` at block {block}")]
    UnknownEvent { name: String, block: u64 },

    /// A recognized event whose payload could not be decoded.
    #[error("malformed `{event}` payload at block {block}: {reason}")]
    MalformedEvent { event: String, block: u64, reason: String },

    /// A transfer that would drive the sender's balance negative, indicating
    /// a gap or ordering defect in the supplied event log.
    #[error("transfer of {amount} at block {block} overdraws {address} (balance {balance})")]
    InvalidTransfer { address: Address, block: u64, amount: U256, balance: U256 },

    /// A balance sum or reward conversion exceeded the 256-bit range.
    #[error("reward computation for {address} overflows the 256-bit amount range")]
    AmountOverflow { address: Address },
}
