//! Outbound request throttle
//!
//! A [`Throttle`] spaces the start of outbound calls to one backend by at
//! least a fixed interval. Calls that arrive too early are delayed, never
//! dropped. Each caller reserves the next free start slot under a short
//! lock, then sleeps outside it until the slot begins.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Minimum-interval gate for one backend service
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller may start its request
    ///
    /// Returns how long the caller was delayed.
    pub async fn ready(&self) -> Duration {
        let now = Instant::now();
        let start = {
            let mut next_slot = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
            let start = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(start + self.interval);
            start
        };

        let delay = start.saturating_duration_since(now);
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Throttling upstream request");
            tokio::time::sleep_until(start).await;
        }
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_not_delayed() {
        let throttle = Throttle::from_millis(100);
        assert_eq!(throttle.ready().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced_by_interval() {
        let throttle = Throttle::from_millis(100);
        let origin = Instant::now();

        throttle.ready().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        throttle.ready().await;

        assert!(origin.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_get_successive_slots() {
        let throttle = Throttle::from_millis(50);
        let origin = Instant::now();

        let (a, b, c) = tokio::join!(throttle.ready(), throttle.ready(), throttle.ready());
        let mut delays = [a, b, c];
        delays.sort();

        assert_eq!(delays[0], Duration::ZERO);
        assert_eq!(delays[1], Duration::from_millis(50));
        assert_eq!(delays[2], Duration::from_millis(100));
        assert!(origin.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_gap_resets_delay() {
        let throttle = Throttle::from_millis(100);
        throttle.ready().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(throttle.ready().await, Duration::ZERO);
    }
}
