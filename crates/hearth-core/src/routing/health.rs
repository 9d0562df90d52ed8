//! Per-provider rolling health tracking
//!
//! Availability here is a heuristic independent of any circuit breaker that
//! may wrap the transport: three consecutive errors mark a provider
//! unavailable, and [`ProviderHealthTracker::should_retest`] is the only way
//! back in for providers without a breaker.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Number of latency samples kept per provider
pub const LATENCY_WINDOW: usize = 20;

/// Consecutive errors after which a provider is marked unavailable
pub const UNAVAILABLE_AFTER_ERRORS: u32 = 3;

/// Default cooldown before an unavailable provider is retried
pub const DEFAULT_RETEST_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct HealthState {
    available: bool,
    last_checked_at: Option<Instant>,
    last_checked_wall: Option<DateTime<Utc>>,
    consecutive_errors: u32,
    latencies: VecDeque<f64>,
    average_latency_ms: f64,
}

impl HealthState {
    fn new() -> Self {
        Self {
            available: true,
            last_checked_at: None,
            last_checked_wall: None,
            consecutive_errors: 0,
            latencies: VecDeque::with_capacity(LATENCY_WINDOW),
            average_latency_ms: 0.0,
        }
    }

    fn stamp(&mut self) {
        self.last_checked_at = Some(Instant::now());
        self.last_checked_wall = Some(Utc::now());
    }
}

/// Point-in-time copy of one provider's health
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub available: bool,
    pub consecutive_errors: u32,
    pub average_latency_ms: f64,
    pub samples: usize,
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Rolling latency and error tracker for a single provider
#[derive(Debug)]
pub struct ProviderHealthTracker {
    state: Mutex<HealthState>,
}

impl ProviderHealthTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HealthState::new()),
        }
    }

    /// Record a successful call and its latency
    pub fn record_success(&self, latency_ms: f64) {
        let mut state = self.state.lock();
        state.available = true;
        state.consecutive_errors = 0;
        if state.latencies.len() == LATENCY_WINDOW {
            state.latencies.pop_front();
        }
        state.latencies.push_back(latency_ms);
        state.average_latency_ms =
            state.latencies.iter().sum::<f64>() / state.latencies.len() as f64;
        state.stamp();
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_errors += 1;
        if state.consecutive_errors >= UNAVAILABLE_AFTER_ERRORS {
            if state.available {
                tracing::warn!(
                    consecutive_errors = state.consecutive_errors,
                    "Provider marked unavailable"
                );
            }
            state.available = false;
        }
        state.stamp();
    }

    pub fn is_available(&self) -> bool {
        self.state.lock().available
    }

    /// Whether the provider may be tried: always when available, otherwise
    /// once `cooldown` has passed since it was last checked.
    pub fn should_retest(&self, cooldown: Duration) -> bool {
        let state = self.state.lock();
        if state.available {
            return true;
        }
        match state.last_checked_at {
            Some(checked) => checked.elapsed() > cooldown,
            None => true,
        }
    }

    pub fn average_latency_ms(&self) -> f64 {
        self.state.lock().average_latency_ms
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.state.lock().consecutive_errors
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.state.lock();
        HealthSnapshot {
            available: state.available,
            consecutive_errors: state.consecutive_errors,
            average_latency_ms: state.average_latency_ms,
            samples: state.latencies.len(),
            last_checked_at: state.last_checked_wall,
        }
    }

    /// Forget all history and mark the provider available again
    pub fn reset(&self) {
        *self.state.lock() = HealthState::new();
    }
}

impl Default for ProviderHealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_available() {
        let tracker = ProviderHealthTracker::new();
        assert!(tracker.is_available());
        assert!(tracker.should_retest(DEFAULT_RETEST_COOLDOWN));
        assert_eq!(tracker.average_latency_ms(), 0.0);
        assert_eq!(tracker.snapshot().last_checked_at, None);
    }

    #[test]
    fn test_unavailable_after_three_failures() {
        let tracker = ProviderHealthTracker::new();
        tracker.record_failure();
        tracker.record_failure();
        assert!(tracker.is_available());

        tracker.record_failure();
        assert!(!tracker.is_available());
        assert_eq!(tracker.consecutive_errors(), 3);
        assert!(!tracker.should_retest(DEFAULT_RETEST_COOLDOWN));
    }

    #[test]
    fn test_success_restores_availability() {
        let tracker = ProviderHealthTracker::new();
        for _ in 0..4 {
            tracker.record_failure();
        }
        tracker.record_success(120.0);

        assert!(tracker.is_available());
        assert_eq!(tracker.consecutive_errors(), 0);
        assert_eq!(tracker.average_latency_ms(), 120.0);
    }

    #[test]
    fn test_latency_window_evicts_oldest() {
        let tracker = ProviderHealthTracker::new();
        tracker.record_success(1000.0);
        for _ in 0..LATENCY_WINDOW {
            tracker.record_success(100.0);
        }

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.samples, LATENCY_WINDOW);
        assert_eq!(snapshot.average_latency_ms, 100.0);
    }

    #[test]
    fn test_average_over_window() {
        let tracker = ProviderHealthTracker::new();
        tracker.record_success(100.0);
        tracker.record_success(200.0);
        tracker.record_success(300.0);
        assert_eq!(tracker.average_latency_ms(), 200.0);
    }

    #[test]
    fn test_retest_after_cooldown() {
        let tracker = ProviderHealthTracker::new();
        for _ in 0..3 {
            tracker.record_failure();
        }
        assert!(!tracker.should_retest(Duration::from_secs(60)));

        std::thread::sleep(Duration::from_millis(15));
        assert!(tracker.should_retest(Duration::from_millis(5)));
    }

    #[test]
    fn test_reset_clears_history() {
        let tracker = ProviderHealthTracker::new();
        tracker.record_success(50.0);
        for _ in 0..3 {
            tracker.record_failure();
        }
        tracker.reset();

        let snapshot = tracker.snapshot();
        assert!(snapshot.available);
        assert_eq!(snapshot.samples, 0);
        assert_eq!(snapshot.consecutive_errors, 0);
    }
}
