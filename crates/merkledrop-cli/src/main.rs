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

use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, B256, U256};
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use clap::Parser;
use futures_util::future::try_join_all;
use merkledrop_distribution::{build_distribution, check_root, RootVerification};
use merkledrop_rewards::{
    compute_holding_rewards, decode_events, parse_price, OrderedEvent, RawEvent,
    RewardsCalculationState, RewardsSummary, TrackingWindow, DEFAULT_ATTESTATION_THRESHOLD,
};
use serde::Serialize;

/// Arguments of the distribution pipeline.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// JSON files holding attestation and wallet-association events, in
    /// chronological order. Multiple files are concatenated in the order
    /// given.
    #[clap(long, env, value_delimiter = ',', required = true, num_args = 1..)]
    identity_events: Vec<PathBuf>,

    /// JSON files holding transfer events, in chronological order.
    #[clap(long, env, value_delimiter = ',', required = true, num_args = 1..)]
    transfer_events: Vec<PathBuf>,

    /// First block of the tracking window.
    #[clap(long, env)]
    start_block: u64,

    /// Last block of the tracking window (inclusive).
    #[clap(long, env)]
    end_block: u64,

    /// Price factor in external currency units per smallest native unit
    /// (decimal string, e.g. "1.0").
    #[clap(long, env, default_value = "1.0")]
    price: String,

    /// Number of distinct attestation issuers an account needs to be
    /// eligible.
    #[clap(long, env, default_value_t = DEFAULT_ATTESTATION_THRESHOLD)]
    attestation_threshold: usize,

    /// Directory the artifacts are written to.
    #[clap(long, env, default_value = "out")]
    output_dir: PathBuf,

    /// Distribution root read from the deployed claim contract, for a
    /// one-shot cross-check against the computed root.
    #[clap(long, env)]
    expected_root: Option<B256>,

    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    log_json: bool,
}

/// The replay-state audit artifact.
#[derive(Serialize)]
struct StateArtifact<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    version: &'static str,
    attestation_threshold: usize,
    summary: &'a RewardsSummary,
    state: &'a RewardsCalculationState,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = MainArgs::parse();

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    if args.log_json {
        tracing_subscriber::fmt().with_ansi(false).json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_ansi(false).with_env_filter(filter).init();
    }

    run(&args).await
}

async fn run(args: &MainArgs) -> Result<()> {
    let window = TrackingWindow::new(args.start_block, args.end_block)?;
    let price_factor = parse_price(&args.price)?;

    tracing::info!(
        "Processing window [{}, {}] with attestation threshold {}",
        window.start_block,
        window.end_block,
        args.attestation_threshold,
    );

    // Event files are static inputs; reading them is the only
    // order-independent work in the pipeline, so it runs concurrently.
    let identity_events = load_event_files(&args.identity_events).await?;
    let transfer_events = load_event_files(&args.transfer_events).await?;
    tracing::info!(
        "Loaded {} identity events and {} transfer events",
        identity_events.len(),
        transfer_events.len(),
    );

    let mut events = identity_events;
    events.extend(transfer_events);

    let mut state = RewardsCalculationState::new(window, price_factor);
    state.replay(&events)?;

    let rewards = compute_holding_rewards(&state, args.attestation_threshold)?;
    let distribution = build_distribution(&rewards.entries)?;

    // Everything computed; only now do artifacts land on disk, so a failed
    // run never leaves partial output behind.
    tokio::fs::create_dir_all(&args.output_dir).await.with_context(|| {
        format!("failed to create output directory {}", args.output_dir.display())
    })?;

    let rewards_by_address: BTreeMap<Address, U256> =
        rewards.entries.iter().map(|entry| (entry.address, entry.amount)).collect();
    write_json(&args.output_dir.join("rewards.json"), &rewards_by_address)?;

    let state_artifact = StateArtifact {
        generated_at: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        attestation_threshold: args.attestation_threshold,
        summary: &rewards.summary,
        state: &state,
    };
    write_json(&args.output_dir.join("state.json"), &state_artifact)?;
    write_json(&args.output_dir.join("distribution.json"), &distribution)?;

    if let Some(expected) = args.expected_root {
        match check_root(distribution.merkle_root, expected) {
            RootVerification::Match { root } => {
                tracing::info!("Computed root matches the supplied root: {root}");
            }
            RootVerification::Mismatch { computed, expected } => {
                tracing::error!(
                    "Root mismatch: computed {computed}, supplied {expected}; artifacts written for inspection"
                );
            }
        }
    }

    tracing::info!("Distribution root: {}", distribution.merkle_root);
    Ok(())
}

/// Read and decode the given event files concurrently, concatenating their
/// batches in the order the caller listed them.
async fn load_event_files(paths: &[PathBuf]) -> Result<Vec<OrderedEvent>> {
    let futures: Vec<_> = paths
        .iter()
        .map(|path| async move {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read event file {}", path.display()))?;
            let raw: Vec<RawEvent> = serde_json::from_slice(&data)
                .with_context(|| format!("failed to parse event file {}", path.display()))?;
            let events = decode_events(&raw)
                .with_context(|| format!("failed to decode events from {}", path.display()))?;
            Ok::<_, anyhow::Error>(events)
        })
        .collect();

    let batches = try_join_all(futures).await?;
    Ok(batches.into_iter().flatten().collect())
}

/// Write a JSON artifact atomically, so a crash mid-write cannot leave a
/// truncated file behind.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).context("failed to serialize artifact")?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&data))
        .with_context(|| format!("failed to write artifact to {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
