//! Outbound request rate limiting
//!
//! A sliding-window limiter shared by every caller of one oracle client.
//! Callers wait until a slot in the current window is free.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-window limiter: at most `max_requests` per `window`
///
/// # Examples
///
/// ```
/// use factlens_llm::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_err());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    sent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter; `max_requests == 0` disables limiting
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            sent: Mutex::new(VecDeque::new()),
        }
    }

    /// Take a slot if one is free, otherwise return how long to wait
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.max_requests == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);

        while let Some(oldest) = sent.front() {
            if now.duration_since(*oldest) >= self.window {
                sent.pop_front();
            } else {
                break;
            }
        }

        if sent.len() < self.max_requests {
            sent.push_back(now);
            return Ok(());
        }

        let oldest = sent.front().copied().unwrap_or(now);
        Err((oldest + self.window).saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_never_waits() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        for _ in 0..100 {
            assert!(limiter.try_acquire().is_ok());
        }
    }

    #[test]
    fn test_limit_is_enforced() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());

        let wait = limiter.try_acquire().unwrap_err();
        assert!(wait > Duration::from_secs(50));
        assert!(wait <= Duration::from_secs(60));
    }

    #[test]
    fn test_window_expiry_frees_slots() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.try_acquire().is_ok());

        let wait = limiter.try_acquire().unwrap_err();
        assert!(wait <= Duration::from_millis(20));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.try_acquire().is_ok());
    }
}
