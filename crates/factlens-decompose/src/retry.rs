//! Bounded retry with attempt-indexed seeds

use std::future::Future;
use tracing::{debug, warn};

/// Result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Fully successful; stop retrying
    Accepted(T),

    /// Usable but imperfect; keep retrying, remember it
    Partial(T),

    /// Nothing usable
    Failed(String),
}

/// Outcome of a retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// Accepted value, else the latest partial value, else `None`
    pub value: Option<T>,

    /// True when `value` came from an accepted attempt
    pub clean: bool,

    /// Number of attempts made
    pub attempts: usize,
}

/// Seed for attempt `attempt` of a loop starting at `base_seed`
pub fn attempt_seed(base_seed: u64, attempt: usize) -> u64 {
    base_seed.wrapping_add(attempt as u64)
}

/// Run `attempt_fn` up to `max_attempts` times
///
/// Attempt `i` (zero based) receives seed `base_seed + i`. The loop stops at
/// the first `Accepted`; otherwise it runs to exhaustion and returns the
/// latest `Partial`. `max_attempts == 0` is treated as 1.
pub async fn retry_with_seeds<T, F, Fut>(
    max_attempts: usize,
    base_seed: u64,
    mut attempt_fn: F,
) -> RetryOutcome<T>
where
    F: FnMut(usize, u64) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut best = None;

    for attempt in 0..max_attempts {
        let seed = attempt_seed(base_seed, attempt);
        match attempt_fn(attempt, seed).await {
            Attempt::Accepted(value) => {
                debug!("Attempt {}/{} accepted (seed {})", attempt + 1, max_attempts, seed);
                return RetryOutcome {
                    value: Some(value),
                    clean: true,
                    attempts: attempt + 1,
                };
            }
            Attempt::Partial(value) => {
                debug!("Attempt {}/{} partial (seed {})", attempt + 1, max_attempts, seed);
                best = Some(value);
            }
            Attempt::Failed(reason) => {
                warn!(
                    "Attempt {}/{} failed (seed {}): {}",
                    attempt + 1,
                    max_attempts,
                    seed,
                    reason
                );
            }
        }
    }

    RetryOutcome {
        value: best,
        clean: false,
        attempts: max_attempts,
    }
}
