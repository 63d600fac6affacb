use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    domain::{DelayMs, Flag},
    error::{ModelError, ModelResult},
};

use super::DelayStrategy;

/// Backoff policy for one class of staggered operations.
///
/// Immutable once constructed and shared read-only across all keys using it.
/// Construction validates the value, so a malformed policy never exists at
/// dispatch time — deserialization goes through the same validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", try_from = "RawBackoffPolicy")]
pub struct BackoffPolicy {
    strategy: DelayStrategy,
    base_ms: DelayMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_ms: Option<DelayMs>,
    jitter: Flag,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_retries: Option<u32>,
}

impl BackoffPolicy {
    /// Build a validated policy.
    ///
    /// Rules:
    /// - `base_ms` must be positive;
    /// - `max_ms`, when set, must not be below `base_ms`.
    pub fn new(
        strategy: DelayStrategy,
        base_ms: DelayMs,
        max_ms: Option<DelayMs>,
        jitter: impl Into<Flag>,
        max_retries: Option<u32>,
    ) -> ModelResult<Self> {
        if base_ms == 0 {
            return Err(ModelError::InvalidPolicy(
                "baseMs must be positive".to_string(),
            ));
        }
        if let Some(max) = max_ms
            && max < base_ms
        {
            return Err(ModelError::InvalidPolicy(format!(
                "maxMs ({max}) must not be below baseMs ({base_ms})"
            )));
        }
        Ok(Self {
            strategy,
            base_ms,
            max_ms,
            jitter: jitter.into(),
            max_retries,
        })
    }

    /// Growth law between attempts.
    pub fn strategy(&self) -> DelayStrategy {
        self.strategy
    }

    /// Base delay in milliseconds. Always positive.
    pub fn base_ms(&self) -> DelayMs {
        self.base_ms
    }

    /// Optional cap applied to the computed delay.
    pub fn max_ms(&self) -> Option<DelayMs> {
        self.max_ms
    }

    /// Whether random jitter is applied to the capped delay.
    pub fn jitter(&self) -> Flag {
        self.jitter
    }

    /// Retry bound; unlimited if absent.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

/// Unvalidated mirror used during deserialization.
#[derive(Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
struct RawBackoffPolicy {
    #[serde(default)]
    strategy: DelayStrategy,
    base_ms: DelayMs,
    #[serde(default)]
    max_ms: Option<DelayMs>,
    #[serde(default)]
    jitter: Flag,
    #[serde(default)]
    max_retries: Option<u32>,
}

impl TryFrom<RawBackoffPolicy> for BackoffPolicy {
    type Error = ModelError;
    fn try_from(raw: RawBackoffPolicy) -> ModelResult<Self> {
        BackoffPolicy::new(
            raw.strategy,
            raw.base_ms,
            raw.max_ms,
            raw.jitter,
            raw.max_retries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_policy() {
        let policy = BackoffPolicy::new(
            DelayStrategy::Linear,
            100,
            Some(5_000),
            Flag::disabled(),
            Some(3),
        )
        .expect("valid policy must construct");

        assert_eq!(policy.strategy(), DelayStrategy::Linear);
        assert_eq!(policy.base_ms(), 100);
        assert_eq!(policy.max_ms(), Some(5_000));
        assert!(policy.jitter().is_disabled());
        assert_eq!(policy.max_retries(), Some(3));
    }

    #[test]
    fn new_rejects_zero_base() {
        let res = BackoffPolicy::new(DelayStrategy::Exponential, 0, None, true, None);
        match res {
            Err(ModelError::InvalidPolicy(msg)) => {
                assert!(msg.contains("baseMs"), "unexpected message: {msg}")
            }
            other => panic!("expected InvalidPolicy, got {other:?}"),
        }
    }

    #[test]
    fn new_rejects_cap_below_base() {
        let res = BackoffPolicy::new(DelayStrategy::Exponential, 500, Some(100), false, None);
        assert!(matches!(res, Err(ModelError::InvalidPolicy(_))));
    }

    #[test]
    fn serde_roundtrip_preserves_fields() {
        let policy =
            BackoffPolicy::new(DelayStrategy::Exponential, 100, Some(2_000), true, Some(5))
                .unwrap();

        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains(r#""strategy":"exponential""#));
        assert!(json.contains(r#""baseMs":100"#));

        let back: BackoffPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_ms(), 100);
        assert_eq!(back.max_ms(), Some(2_000));
        assert_eq!(back.max_retries(), Some(5));
    }

    #[test]
    fn deserialization_fails_fast_on_invalid_policy() {
        let json = r#"{"strategy":"linear","baseMs":0,"jitter":false}"#;
        let res: Result<BackoffPolicy, _> = serde_json::from_str(json);
        assert!(res.is_err(), "zero baseMs must not deserialize");
    }

    #[test]
    fn deserialization_defaults_optional_fields() {
        let json = r#"{"baseMs":250}"#;
        let policy: BackoffPolicy = serde_json::from_str(json).unwrap();

        assert_eq!(policy.strategy(), DelayStrategy::Exponential);
        assert!(policy.jitter().is_enabled());
        assert_eq!(policy.max_ms(), None);
        assert_eq!(policy.max_retries(), None);
    }
}
