//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::resilience::retries::RetryPolicy;

/// Delay before retry number `retry` (1-based) under `policy`: the base
/// delay doubled per retry, capped at the policy maximum, plus up to 10%
/// jitter so retried hosts do not re-probe in lockstep. Retry 0 waits nothing.
pub fn calculate_backoff(retry: u32, policy: &RetryPolicy) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(retry - 1);
    let capped = policy
        .base_delay
        .saturating_mul(factor)
        .min(policy.max_delay);

    let jitter_cap = capped / 10;
    let jitter = if jitter_cap.is_zero() {
        Duration::ZERO
    } else {
        rand::thread_rng().gen_range(Duration::ZERO..jitter_cap)
    };
    capped.saturating_add(jitter)
}
