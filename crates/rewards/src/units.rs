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

//! Fixed-point monetary arithmetic.
//!
//! All balance and reward math is 256-bit integer arithmetic; the price
//! factor is an 18-decimal fixed-point value. Native floating point would
//! drift across platforms and can never match the on-chain fixed-point
//! computation bit for bit.

use alloy_primitives::{utils::parse_units, U256, U512};
use anyhow::{ensure, Context};

/// Decimal places of the fixed-point price factor.
pub const PRICE_DECIMALS: u8 = 18;

/// Parse a decimal price string (external currency units per smallest native
/// unit) into its 18-decimal fixed-point representation.
pub fn parse_price(price: &str) -> anyhow::Result<U256> {
    ensure!(!price.trim_start().starts_with('-'), "price factor must be non-negative");
    let parsed = parse_units(price, PRICE_DECIMALS)
        .with_context(|| format!("failed to parse price factor `{price}`"))?;
    Ok(parsed.into())
}

/// `value * numerator / denominator` with a single round-half-up division,
/// widening through 512 bits so the product never truncates. Returns `None`
/// if the denominator is zero or the result exceeds 256 bits.
pub fn mul_div_half_up(value: U256, numerator: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let wide = U512::from(value) * U512::from(numerator);
    let den = U512::from(denominator);
    let (quotient, remainder) = wide.div_rem(den);
    let rounded = if remainder + remainder >= den { quotient + U512::from(1u8) } else { quotient };
    (rounded <= U512::from(U256::MAX)).then(|| rounded.to::<U256>())
}

/// Convert an exact block-weighted balance sum into a reward amount:
/// `weighted_sum * price / (window length * 10^18)`, rounded half-up once.
pub fn reward_amount(weighted_sum: U256, price_factor: U256, window_blocks: u64) -> Option<U256> {
    let scale = U256::from(1_000_000_000_000_000_000u64);
    mul_div_half_up(weighted_sum, price_factor, U256::from(window_blocks) * scale)
}
