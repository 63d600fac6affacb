//! Pure delay math for the stagger controller.
//!
//! Exactly one calculator, parameterized by [`BackoffPolicy`]; there is no
//! separate legacy variant.

use std::time::Duration;

use rand::Rng;

use pacer_model::{BackoffPolicy, DelayStrategy};

/// Deterministic pre-jitter delay for the given 0-based attempt.
///
/// - exponential: `base × 2^attempt`
/// - linear: `base × (attempt + 1)`
///
/// The result is capped to the policy's `max_ms` when set. Exponential growth
/// saturates instead of overflowing; the policy's retry bound is the practical
/// ceiling that keeps attempts in a sane range.
pub fn raw_delay(policy: &BackoffPolicy, attempt: u32) -> Duration {
    let base = policy.base_ms();
    let grown = match policy.strategy() {
        DelayStrategy::Exponential => match 1u64.checked_shl(attempt) {
            Some(factor) => base.saturating_mul(factor),
            None => u64::MAX,
        },
        DelayStrategy::Linear => base.saturating_mul(u64::from(attempt) + 1),
    };

    let capped = match policy.max_ms() {
        Some(max) => grown.min(max),
        None => grown,
    };
    Duration::from_millis(capped)
}

/// Delay actually applied before dispatch.
///
/// When the policy enables jitter, the capped delay is multiplied by a uniform
/// factor in `[0.8, 1.2]`. Jitter is applied after capping, so the final delay
/// may overshoot `max_ms` by up to 20% — a bounded, intentional overshoot.
pub fn stagger_delay(policy: &BackoffPolicy, attempt: u32) -> Duration {
    let capped = raw_delay(policy, attempt);
    if policy.jitter().is_disabled() {
        return capped;
    }

    let factor: f64 = rand::rng().random_range(0.8..=1.2);
    capped.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pacer_model::{BackoffPolicy, DelayStrategy};

    use super::{raw_delay, stagger_delay};

    fn mk_policy(
        strategy: DelayStrategy,
        base_ms: u64,
        max_ms: Option<u64>,
        jitter: bool,
        max_retries: Option<u32>,
    ) -> BackoffPolicy {
        BackoffPolicy::new(strategy, base_ms, max_ms, jitter, max_retries)
            .expect("test policy must be valid")
    }

    #[test]
    fn linear_sequence_grows_by_base_steps() {
        // base 100ms, cap 5000ms: attempts 0..=3 give 100/200/300/400.
        let policy = mk_policy(DelayStrategy::Linear, 100, Some(5_000), false, Some(3));

        let delays: Vec<u64> = (0..=3)
            .map(|n| raw_delay(&policy, n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 300, 400]);
    }

    #[test]
    fn exponential_caps_at_max() {
        // raw 100 × 2^5 = 3200ms, capped to 2000ms.
        let policy = mk_policy(DelayStrategy::Exponential, 100, Some(2_000), false, Some(5));
        assert_eq!(raw_delay(&policy, 5), Duration::from_millis(2_000));
    }

    #[test]
    fn exponential_growth_is_monotonic_before_cap() {
        let policy = mk_policy(DelayStrategy::Exponential, 100, None, false, None);

        for n in 1..=20u32 {
            let prev = raw_delay(&policy, n - 1);
            let cur = raw_delay(&policy, n);
            assert!(cur >= prev, "delay shrank between attempts {} and {n}", n - 1);
        }
    }

    #[test]
    fn pre_jitter_delay_never_exceeds_cap() {
        let policy = mk_policy(DelayStrategy::Exponential, 100, Some(1_500), false, None);

        for n in 0..=32u32 {
            assert!(raw_delay(&policy, n) <= Duration::from_millis(1_500));
        }
    }

    #[test]
    fn huge_exponential_attempt_saturates_instead_of_overflowing() {
        let policy = mk_policy(DelayStrategy::Exponential, 100, Some(10_000), false, None);
        assert_eq!(raw_delay(&policy, 200), Duration::from_millis(10_000));

        let uncapped = mk_policy(DelayStrategy::Exponential, 100, None, false, None);
        assert_eq!(raw_delay(&uncapped, 200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = mk_policy(DelayStrategy::Exponential, 1_000, None, true, None);
        let capped = raw_delay(&policy, 0);

        for _ in 0..200 {
            let jittered = stagger_delay(&policy, 0);
            assert!(
                jittered >= capped.mul_f64(0.8) && jittered <= capped.mul_f64(1.2),
                "jittered delay {jittered:?} outside [0.8, 1.2] × {capped:?}"
            );
        }
    }

    #[test]
    fn jitter_may_overshoot_the_cap_but_only_boundedly() {
        // Capped delay equals the cap; jitter can push up to 20% past it.
        let policy = mk_policy(DelayStrategy::Exponential, 1_000, Some(1_000), true, None);
        let cap = Duration::from_millis(1_000);

        for _ in 0..200 {
            let jittered = stagger_delay(&policy, 4);
            assert!(jittered <= cap.mul_f64(1.2), "overshoot beyond 20%: {jittered:?}");
            assert!(jittered >= cap.mul_f64(0.8));
        }
    }

    #[test]
    fn jitter_disabled_is_deterministic() {
        let policy = mk_policy(DelayStrategy::Linear, 250, None, false, None);
        let a = stagger_delay(&policy, 2);
        let b = stagger_delay(&policy, 2);
        assert_eq!(a, b);
        assert_eq!(a, Duration::from_millis(750));
    }
}
