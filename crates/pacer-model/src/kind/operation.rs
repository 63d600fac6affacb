use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Kind of outbound operation performed against the backend.
///
/// Together with the subject id this forms the staggering key: operations of
/// the same kind for the same subject share one pacing lane, while different
/// kinds for the same subject are fully independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Create a new subscription / order.
    Create,
    /// Update an existing one.
    Update,
    /// Cancel it.
    Cancel,
    /// Change the delivery frequency.
    FrequencyChange,
    /// Pause deliveries.
    Pause,
    /// Resume deliveries.
    Resume,
}

impl OperationKind {
    /// Returns the kind as a static string.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Cancel => "cancel",
            OperationKind::FrequencyChange => "frequency-change",
            OperationKind::Pause => "pause",
            OperationKind::Resume => "resume",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl FromStr for OperationKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" | "created" => Ok(OperationKind::Create),
            "update" | "updated" => Ok(OperationKind::Update),
            "cancel" | "canceled" | "cancelled" => Ok(OperationKind::Cancel),
            "frequency-change" | "frequency" => Ok(OperationKind::FrequencyChange),
            "pause" | "paused" => Ok(OperationKind::Pause),
            "resume" | "resumed" => Ok(OperationKind::Resume),
            other => Err(ModelError::UnknownOperationKind(other.to_string())),
        }
    }
}
