use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    domain::Flag,
    error::{ModelError, ModelResult},
};

use super::{BackoffPolicy, DelayStrategy};

/// Named backoff presets distinguished by aggressiveness.
///
/// Presets are immutable data looked up by name; the controller accepts either
/// a preset's policy or a fully custom [`BackoffPolicy`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum PolicyPreset {
    /// Gentle linear spacing for bulk batch work.
    BulkBatch,
    /// Fast exponential spacing for single retried calls.
    SingleCall,
    /// Tight bounds for load-test scenarios.
    LoadTest,
}

impl PolicyPreset {
    /// Returns the preset name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyPreset::BulkBatch => "bulk-batch",
            PolicyPreset::SingleCall => "single-call",
            PolicyPreset::LoadTest => "load-test",
        }
    }

    /// Resolve the preset into its policy value.
    pub fn policy(&self) -> BackoffPolicy {
        let policy = match self {
            PolicyPreset::BulkBatch => BackoffPolicy::new(
                DelayStrategy::Linear,
                1_000,
                Some(15_000),
                Flag::enabled(),
                Some(5),
            ),
            PolicyPreset::SingleCall => BackoffPolicy::new(
                DelayStrategy::Exponential,
                100,
                Some(2_000),
                Flag::enabled(),
                Some(3),
            ),
            PolicyPreset::LoadTest => BackoffPolicy::new(
                DelayStrategy::Exponential,
                50,
                Some(500),
                Flag::disabled(),
                Some(2),
            ),
        };
        policy.expect("preset policies are statically valid")
    }

    /// All known presets, in catalog order.
    pub fn all() -> [PolicyPreset; 3] {
        [
            PolicyPreset::BulkBatch,
            PolicyPreset::SingleCall,
            PolicyPreset::LoadTest,
        ]
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyPreset {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk-batch" | "bulk" | "batch" => Ok(PolicyPreset::BulkBatch),
            "single-call" | "single" => Ok(PolicyPreset::SingleCall),
            "load-test" | "loadtest" => Ok(PolicyPreset::LoadTest),
            other => Err(ModelError::UnknownPreset(other.to_string())),
        }
    }
}
