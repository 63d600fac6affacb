use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Growth law applied to the staggering delay between attempts.
///
/// The attempt number is 0-based; the exact math lives in the delay
/// calculator. This enum only specifies the policy.
///
/// Strategies:
/// - `Exponential`: delay doubles with each attempt (`base × 2^n`).
/// - `Linear`: delay grows by one base step per attempt (`base × (n + 1)`).
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum DelayStrategy {
    /// Delay doubles with each attempt.
    #[default]
    Exponential,
    /// Delay grows by a fixed base step per attempt.
    Linear,
}

impl FromStr for DelayStrategy {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "exponential" | "exp" => Ok(DelayStrategy::Exponential),
            "linear" => Ok(DelayStrategy::Linear),
            other => Err(ModelError::UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::DelayStrategy;

    #[test]
    fn parses_known_strategies() {
        assert_eq!(
            DelayStrategy::from_str("exponential").unwrap(),
            DelayStrategy::Exponential
        );
        assert_eq!(
            DelayStrategy::from_str("linear").unwrap(),
            DelayStrategy::Linear
        );
        assert_eq!(
            DelayStrategy::from_str("").unwrap(),
            DelayStrategy::Exponential
        );
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(DelayStrategy::from_str("fibonacci").is_err());
    }
}
