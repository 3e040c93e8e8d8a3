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

//! Root cross-checking against an externally supplied value.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Outcome of comparing the computed root to an external one (typically read
/// from the deployed claim contract). A mismatch is an expected possible
/// outcome, reported as a value so the computed artifacts can still be
/// inspected; it is never a processing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RootVerification {
    Match { root: B256 },
    Mismatch { computed: B256, expected: B256 },
}

impl RootVerification {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Compare the computed root byte-for-byte against the external root.
pub fn check_root(computed: B256, expected: B256) -> RootVerification {
    if computed == expected {
        RootVerification::Match { root: computed }
    } else {
        RootVerification::Mismatch { computed, expected }
    }
}
