//! Minimum-interval gate used to pace calls to external services.
//!
//! Every component that talks to the network owns a [`RateGate`] and awaits
//! [`RateGate::wait`] right before each call. A gate built with a zero
//! interval never sleeps.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_pass: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_pass: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until at least `min_interval` has passed since the previous call
    /// returned. The first call never waits.
    pub async fn wait(&self) {
        let mut last_pass = self.last_pass.lock().await;
        if let Some(previous) = *last_pass {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!(?delay, "Pacing external call");
                sleep(delay).await;
            }
        }
        *last_pass = Some(Instant::now());
    }

    /// Restart the interval from now without waiting.
    ///
    /// Called when a unit of work guarded by the gate has finished, so the
    /// next [`RateGate::wait`] measures from the end of that work rather than
    /// from its start.
    pub async fn mark(&self) {
        *self.last_pass.lock().await = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_passes_immediately() {
        let gate = RateGate::new(Duration::from_secs(5));
        let t0 = std::time::Instant::now();
        gate.wait().await;
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let gate = RateGate::new(Duration::from_millis(60));
        let t0 = std::time::Instant::now();
        gate.wait().await;
        gate.wait().await;
        gate.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_mark_restarts_interval() {
        let gate = RateGate::new(Duration::from_millis(80));
        gate.wait().await;
        sleep(Duration::from_millis(60)).await;
        gate.mark().await;
        let t0 = std::time::Instant::now();
        gate.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn test_mark_before_first_wait() {
        let gate = RateGate::new(Duration::from_millis(50));
        gate.mark().await;
        let t0 = std::time::Instant::now();
        gate.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(45));
    }

    #[tokio::test]
    async fn test_zero_interval_never_sleeps() {
        let gate = RateGate::new(Duration::ZERO);
        let t0 = std::time::Instant::now();
        for _ in 0..100 {
            gate.wait().await;
        }
        assert!(t0.elapsed() < Duration::from_secs(1));
        assert_eq!(gate.min_interval(), Duration::ZERO);
    }
}
