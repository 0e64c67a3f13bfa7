//! Sliding-window operation limiter.
//!
//! Callers that exceed the budget are delayed until the oldest grant leaves
//! the window; the limiter never fails an operation. Only an enclosing
//! timeout can turn throttling into an error.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Limit to `max_per_minute` operations in any 60 second window. Zero disables the limit.
    pub fn per_minute(max_per_minute: u32) -> Self {
        Self::new(max_per_minute as usize, WINDOW)
    }

    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            grants: Mutex::new(VecDeque::with_capacity(max_per_window)),
        }
    }

    /// Wait until an operation may proceed, then record it.
    pub async fn acquire(&self) {
        if self.max_per_window == 0 {
            return;
        }
        loop {
            let wait = {
                let mut grants = self.grants.lock().await;
                let now = Instant::now();
                while grants
                    .front()
                    .is_some_and(|granted| now.duration_since(*granted) >= self.window)
                {
                    grants.pop_front();
                }
                match grants.front() {
                    Some(oldest) if grants.len() >= self.max_per_window => {
                        (*oldest + self.window).saturating_duration_since(now)
                    }
                    _ => {
                        grants.push_back(now);
                        return;
                    }
                }
            };
            debug!(wait_ms = wait.as_millis() as u64, "operation budget exhausted, throttling");
            tokio::time::sleep(wait).await;
        }
    }

    /// Operations granted within the current window.
    pub async fn in_window(&self) -> usize {
        let grants = self.grants.lock().await;
        let now = Instant::now();
        grants
            .iter()
            .filter(|granted| now.duration_since(**granted) < self.window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn grants_up_to_budget_without_waiting() {
        let limiter = RateLimiter::per_minute(20);
        let start = Instant::now();
        for _ in 0..20 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window().await, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn throttles_past_budget_instead_of_failing() {
        let limiter = RateLimiter::per_minute(20);
        let start = Instant::now();
        for _ in 0..21 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_is_unlimited() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.in_window().await, 0);
    }
}
