//! Client-side rate limiting for the upstream fact API.
//!
//! One limiter is shared by every session's client; the counters are
//! process-global. The per-second window resets whenever more than a second
//! has elapsed since the last reset; the monthly counter never resets within
//! a process lifetime.

use crate::config::RateLimitConfig;
use crate::error::ToolError;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const SECOND_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct Counters {
    second: u32,
    month: u32,
    last_reset: Instant,
}

/// Process-wide request counters with check-and-increment semantics.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimitConfig,
    counters: Mutex<Counters>,
}

impl RateLimiter {
    pub fn new(limits: RateLimitConfig) -> Self {
        Self {
            limits,
            counters: Mutex::new(Counters {
                second: 0,
                month: 0,
                last_reset: Instant::now(),
            }),
        }
    }

    /// Check the ceilings and claim one request slot. A refused call leaves
    /// the counters untouched.
    pub fn check_and_count(&self) -> Result<(), ToolError> {
        self.check_and_count_at(Instant::now())
    }

    fn check_and_count_at(&self, now: Instant) -> Result<(), ToolError> {
        let mut counters = self.counters.lock().expect("rate limiter poisoned");

        if now.duration_since(counters.last_reset) > SECOND_WINDOW {
            counters.second = 0;
            counters.last_reset = now;
        }

        if counters.second >= self.limits.per_second || counters.month >= self.limits.per_month {
            return Err(ToolError::RateLimitExceeded);
        }

        counters.second += 1;
        counters.month += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(per_second: u32, per_month: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            per_second,
            per_month,
        })
    }

    #[test]
    fn refuses_beyond_per_second_ceiling() {
        let limiter = limiter(2, 100);
        let now = Instant::now();
        assert!(limiter.check_and_count_at(now).is_ok());
        assert!(limiter.check_and_count_at(now).is_ok());
        assert!(matches!(
            limiter.check_and_count_at(now),
            Err(ToolError::RateLimitExceeded)
        ));
    }

    #[test]
    fn second_window_resets_after_one_second() {
        let limiter = limiter(1, 100);
        let start = Instant::now();
        assert!(limiter.check_and_count_at(start).is_ok());
        assert!(limiter.check_and_count_at(start).is_err());

        // Exactly 1000ms is still inside the window.
        let at_window = start + Duration::from_millis(1000);
        assert!(limiter.check_and_count_at(at_window).is_err());

        let past_window = start + Duration::from_millis(1001);
        assert!(limiter.check_and_count_at(past_window).is_ok());
    }

    #[test]
    fn monthly_ceiling_survives_second_resets() {
        let limiter = limiter(10, 2);
        let start = Instant::now();
        assert!(limiter.check_and_count_at(start).is_ok());
        assert!(limiter.check_and_count_at(start).is_ok());

        let later = start + Duration::from_secs(5);
        assert!(matches!(
            limiter.check_and_count_at(later),
            Err(ToolError::RateLimitExceeded)
        ));
    }

    #[test]
    fn refused_call_does_not_consume_a_slot() {
        let limiter = limiter(1, 1);
        let start = Instant::now();
        assert!(limiter.check_and_count_at(start).is_ok());
        assert!(limiter.check_and_count_at(start).is_err());

        // The refused call above must not have burned the monthly budget
        // beyond the one granted slot.
        let counters = limiter.counters.lock().unwrap();
        assert_eq!(counters.month, 1);
    }
}
