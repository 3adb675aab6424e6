//! Single-flight token refresh
//!
//! When several requests hit a 401 at the same time they must not each
//! exchange the refresh token: the first one starts the exchange and the
//! rest wait for its result.
//!
//! ## States
//! - **Idle**: the slot is empty; the next caller starts a refresh.
//! - **Refreshing**: the slot holds a shared future; callers clone it and
//!   await the same result.
//! - **Settled**: the refresh task empties the slot as its last step,
//!   before any waiter observes the result, so the coordinator is Idle
//!   again by the time anyone resumes. The refresh runs as a spawned task,
//!   so it settles even when every waiter has been cancelled.
//!
//! ## Synchronization
//! The slot lives behind a `parking_lot::Mutex`. Check-and-set happens in
//! one critical section, so two callers can never both see Idle. The lock is
//! never held across an `.await`. Clearing compares the in-flight id so a
//! settled refresh can only remove itself.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bookstore_domain::TokenPair;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::errors::ApiError;
use crate::observability::ClientMetrics;

/// Result every waiter receives from a shared refresh
pub type RefreshResult = Result<TokenPair, ApiError>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

struct InFlight {
    id: u64,
    future: SharedRefresh,
}

/// Coordinates at most one refresh operation at a time
pub struct RefreshCoordinator {
    slot: Arc<Mutex<Option<InFlight>>>,
    next_id: AtomicU64,
    metrics: Arc<ClientMetrics>,
}

impl RefreshCoordinator {
    pub fn new(metrics: Arc<ClientMetrics>) -> Self {
        Self { slot: Arc::new(Mutex::new(None)), next_id: AtomicU64::new(0), metrics }
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Join the in-flight refresh, or start one with `start` if none is
    /// running.
    ///
    /// `start` is only invoked when this caller is the one starting the
    /// refresh. Its future is spawned onto the runtime, so it runs to
    /// completion and clears the slot even if every caller goes away.
    pub async fn refresh_with<F, Fut>(&self, start: F) -> RefreshResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshResult> + Send + 'static,
    {
        let shared = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(in_flight) => {
                    self.metrics.record_refresh_joined();
                    debug!(refresh_id = in_flight.id, "joining in-flight token refresh");
                    in_flight.future.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let future = settle_then_clear(Arc::clone(&self.slot), id, start());
                    *slot = Some(InFlight { id, future: future.clone() });
                    self.metrics.record_refresh_started();
                    debug!(refresh_id = id, "starting token refresh");
                    future
                }
            }
        };

        shared.await
    }
}

/// Empties the slot when the refresh task ends, whether it returns or panics.
struct ClearOnDrop {
    slot: Arc<Mutex<Option<InFlight>>>,
    id: u64,
}

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|in_flight| in_flight.id == self.id) {
            *slot = None;
        }
    }
}

/// Run `refresh` as its own task and share its result.
///
/// The task does not depend on anyone polling the shared handle, so a
/// refresh whose waiters were all cancelled still settles and frees the
/// slot.
fn settle_then_clear<Fut>(
    slot: Arc<Mutex<Option<InFlight>>>,
    id: u64,
    refresh: Fut,
) -> SharedRefresh
where
    Fut: Future<Output = RefreshResult> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let guard = ClearOnDrop { slot, id };
        let result = refresh.await;
        drop(guard);
        result
    });

    async move {
        task.await.unwrap_or_else(|err| {
            warn!(refresh_id = id, error = %err, "token refresh task did not complete");
            Err(ApiError::unexpected(format!("token refresh task failed: {err}")))
        })
    }
    .boxed()
    .shared()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;

    fn coordinator() -> (Arc<RefreshCoordinator>, Arc<ClientMetrics>) {
        let metrics = Arc::new(ClientMetrics::new());
        (Arc::new(RefreshCoordinator::new(Arc::clone(&metrics))), metrics)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let (coordinator, metrics) = coordinator();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..5 {
            let coordinator = Arc::clone(&coordinator);
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                coordinator
                    .refresh_with(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Ok(TokenPair::new("fresh"))
                    })
                    .await
            }));
        }

        // Let every task reach the coordinator before releasing the refresh.
        while metrics.snapshot().refreshes_joined < 4 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(coordinator.is_refreshing());
        gate.notify_one();

        for handle in handles {
            let tokens = handle.await.unwrap().unwrap();
            assert_eq!(tokens.access_token, "fresh");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.snapshot().refreshes_started, 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn slot_is_cleared_after_success_and_failure() {
        let (coordinator, metrics) = coordinator();

        let first = coordinator.refresh_with(|| async { Ok(TokenPair::new("a")) }).await;
        assert!(first.is_ok());
        assert!(!coordinator.is_refreshing());

        let second =
            coordinator.refresh_with(|| async { Err(ApiError::SessionExpired) }).await;
        assert!(matches!(second, Err(ApiError::SessionExpired)));
        assert!(!coordinator.is_refreshing());

        let third = coordinator.refresh_with(|| async { Ok(TokenPair::new("b")) }).await;
        assert_eq!(third.unwrap().access_token, "b");
        assert_eq!(metrics.snapshot().refreshes_started, 3);
        assert_eq!(metrics.snapshot().refreshes_joined, 0);
    }

    #[tokio::test]
    async fn abandoned_refresh_still_settles() {
        let (coordinator, metrics) = coordinator();
        let gate = Arc::new(Notify::new());

        let waiter_gate = Arc::clone(&gate);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            coordinator.refresh_with(move || async move {
                waiter_gate.notified().await;
                Ok(TokenPair::new("late"))
            }),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(coordinator.is_refreshing());

        // Nobody is waiting any more; the refresh must finish on its own.
        gate.notify_one();
        for _ in 0..100 {
            if !coordinator.is_refreshing() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!coordinator.is_refreshing());

        let next = coordinator.refresh_with(|| async { Ok(TokenPair::new("fresh")) }).await;
        assert_eq!(next.unwrap().access_token, "fresh");
        assert_eq!(metrics.snapshot().refreshes_started, 2);
        assert_eq!(metrics.snapshot().refreshes_joined, 0);
    }

    #[tokio::test]
    async fn panicking_refresh_is_unexpected_and_clears_the_slot() {
        let (coordinator, _metrics) = coordinator();

        let result = coordinator
            .refresh_with(|| async {
                if true {
                    panic!("refresh blew up");
                }
                Ok(TokenPair::new("never"))
            })
            .await;

        assert!(matches!(result, Err(ApiError::Unexpected { .. })));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn refresh_survives_the_starting_caller_being_dropped() {
        let (coordinator, _metrics) = coordinator();
        let gate = Arc::new(Notify::new());

        let starter = {
            let coordinator = Arc::clone(&coordinator);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                coordinator
                    .refresh_with(move || async move {
                        gate.notified().await;
                        Ok(TokenPair::new("late"))
                    })
                    .await
            })
        };

        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        starter.abort();
        let _ = starter.await;

        let joiner = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator.refresh_with(|| async { Ok(TokenPair::new("unused")) }).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.notify_one();

        assert_eq!(joiner.await.unwrap().unwrap().access_token, "late");
        assert!(!coordinator.is_refreshing());
    }
}
