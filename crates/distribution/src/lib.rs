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

//! Deterministic Merkle distribution trees over a reward set.
//!
//! The leaf encoding and sibling-ordering rules here are a pinned wire
//! format: they must match the on-chain claim verifier bit for bit, and are
//! versioned so the artifact records which scheme produced it.

// Declare modules
pub mod claims;
pub mod tree;
pub mod verify;

// Re-export commonly used types
pub use claims::{build_distribution, ClaimEntry, DistributionArtifact};

pub use tree::{encode_leaf, leaf_hash, verify_proof, MerkleTree, LEAF_ENCODING_VERSION};

pub use verify::{check_root, RootVerification};
