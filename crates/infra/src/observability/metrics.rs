//! Counters for the resilient API client
//!
//! ## Design
//! - Plain atomics, no locks: every counter is independent
//! - Relaxed ordering for increments; [`ClientMetrics::snapshot`] reads with
//!   SeqCst so a snapshot taken after all requests settle is exact

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every clone of an `ApiClient`
#[derive(Debug, Default)]
pub struct ClientMetrics {
    requests_sent: AtomicU64,
    refreshes_started: AtomicU64,
    refreshes_joined: AtomicU64,
    refresh_failures: AtomicU64,
    replays: AtomicU64,
}

/// Point-in-time copy of [`ClientMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Caller requests handed to the transport, replays included
    pub requests_sent: u64,
    /// Refresh calls actually issued
    pub refreshes_started: u64,
    /// Callers that waited on a refresh someone else started
    pub refreshes_joined: u64,
    pub refresh_failures: u64,
    pub replays: u64,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_started(&self) {
        self.refreshes_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_joined(&self) {
        self.refreshes_joined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_failure(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay(&self) {
        self.replays.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::SeqCst),
            refreshes_started: self.refreshes_started.load(Ordering::SeqCst),
            refreshes_joined: self.refreshes_joined.load(Ordering::SeqCst),
            refresh_failures: self.refresh_failures.load(Ordering::SeqCst),
            replays: self.replays.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = ClientMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_refresh_started();
        metrics.record_refresh_joined();
        metrics.record_replay();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_sent, 2);
        assert_eq!(snapshot.refreshes_started, 1);
        assert_eq!(snapshot.refreshes_joined, 1);
        assert_eq!(snapshot.refresh_failures, 0);
        assert_eq!(snapshot.replays, 1);
    }
}
