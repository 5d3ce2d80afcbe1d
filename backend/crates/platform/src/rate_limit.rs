//! Rate Limiting Infrastructure
//!
//! In-process, fixed-window rate limiting keyed by client identity.
//!
//! - [`ExpiringWindowStore`] maps identity -> "quota available at" under a
//!   single mutex. Acquisition is a non-blocking check-and-set: a denied
//!   caller does not move its own window.
//! - [`SweepTask`] periodically evicts entries whose time has passed.
//! - [`RateLimiter`] combines both and exposes default / explicit windows.
//!
//! Time comes from [`tokio::time::Instant`], so tests can drive it with a
//! paused clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window used by [`RateLimiter::allow`]
    pub default_window: Duration,
    /// Interval between eviction passes
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_window: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Identity -> instant at which the next acquisition is allowed.
///
/// At most one entry per identity. Every read and write happens under the
/// one lock, so each [`try_acquire`](Self::try_acquire) is atomic.
#[derive(Debug, Default)]
pub struct ExpiringWindowStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl ExpiringWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant if `identity` has no entry or its window has elapsed, and start
    /// a new window of length `window`. Otherwise deny and leave the entry as is.
    pub fn try_acquire(&self, identity: &str, window: Duration) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();

        if let Some(available_at) = entries.get_mut(identity) {
            if now < *available_at {
                return false;
            }
            *available_at = now + window;
            return true;
        }

        entries.insert(identity.to_owned(), now + window);
        true
    }

    /// Remove every entry whose available-at instant has passed.
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, available_at| now <= *available_at);
        before - entries.len()
    }

    /// Number of tracked identities
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Poisoning is ignored: entries are plain timestamps.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Sweep
// ============================================================================

/// Background eviction task with an explicit start/stop lifecycle.
///
/// Stopping is idempotent and never blocks, even after the task has ended.
#[derive(Debug)]
pub struct SweepTask {
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SweepTask {
    /// Start sweeping `store` every `period`. Must be called inside a Tokio runtime.
    pub fn start(store: Arc<ExpiringWindowStore>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_sweep_loop(store, period, cancel.clone()));

        Self {
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Signal the task to stop without waiting for it.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Rate limit sweep task ended abnormally");
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_sweep_loop(
    store: Arc<ExpiringWindowStore>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(interval_ms = period.as_millis() as u64, "Rate limit sweep started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Rate limit sweep shutting down");
                break;
            }
            _ = ticker.tick() => {
                let removed = store.sweep();
                if removed > 0 {
                    tracing::debug!(removed, remaining = store.len(), "Swept expired rate limit entries");
                }
            }
        }
    }
}

// ============================================================================
// Limiter
// ============================================================================

/// Facade over [`ExpiringWindowStore`] owning the sweep lifecycle.
///
/// Constructed once at startup and shared (`Arc`) with request handlers.
#[derive(Debug)]
pub struct RateLimiter {
    store: Arc<ExpiringWindowStore>,
    default_window: Duration,
    sweep: SweepTask,
}

impl RateLimiter {
    /// Create the limiter and start its sweep. Must be called inside a Tokio runtime.
    pub fn start(config: RateLimitConfig) -> Self {
        let store = Arc::new(ExpiringWindowStore::new());
        let sweep = SweepTask::start(store.clone(), config.sweep_interval);

        Self {
            store,
            default_window: config.default_window,
            sweep,
        }
    }

    /// May `identity` proceed now under the default window?
    pub fn allow(&self, identity: &str) -> bool {
        self.allow_with_window(identity, self.default_window)
    }

    /// May `identity` proceed now under `window`?
    pub fn allow_with_window(&self, identity: &str, window: Duration) -> bool {
        let allowed = self.store.try_acquire(identity, window);
        if !allowed {
            tracing::debug!(identity = %identity, window_ms = window.as_millis() as u64, "Quota denied");
        }
        allowed
    }

    /// Number of identities currently tracked
    pub fn tracked_identities(&self) -> usize {
        self.store.len()
    }

    /// Stop the sweep and wait for it. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.sweep.shutdown().await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.sweep.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tokio::time::{advance, sleep};

    const WINDOW: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn test_grant_deny_grant_cycle() {
        let store = ExpiringWindowStore::new();

        assert!(store.try_acquire("10.0.0.1", WINDOW));
        assert!(!store.try_acquire("10.0.0.1", WINDOW));

        advance(Duration::from_millis(999)).await;
        assert!(!store.try_acquire("10.0.0.1", WINDOW));

        advance(Duration::from_millis(1)).await;
        assert!(store.try_acquire("10.0.0.1", WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_call_does_not_extend_window() {
        let store = ExpiringWindowStore::new();
        assert!(store.try_acquire("peer", WINDOW));

        for _ in 0..5 {
            advance(Duration::from_millis(150)).await;
            assert!(!store.try_acquire("peer", WINDOW));
        }

        // 750ms elapsed; first window ends at 1s regardless of retries
        advance(Duration::from_millis(250)).await;
        assert!(store.try_acquire("peer", WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identities_are_independent() {
        let store = ExpiringWindowStore::new();
        assert!(store.try_acquire("a", Duration::from_secs(10)));
        assert!(store.try_acquire("b", Duration::from_secs(10)));
        assert!(!store.try_acquire("a", Duration::from_secs(10)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_window_is_used_for_new_grant() {
        let store = ExpiringWindowStore::new();
        assert!(store.try_acquire("a", Duration::from_secs(10)));

        advance(Duration::from_secs(10)).await;
        assert!(store.try_acquire("a", Duration::from_secs(1)));

        advance(Duration::from_secs(1)).await;
        assert!(store.try_acquire("a", Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_window_never_denies() {
        let store = ExpiringWindowStore::new();
        assert!(store.try_acquire("a", Duration::ZERO));
        assert!(store.try_acquire("a", Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_sweep_keeps_live_entries() {
        let store = ExpiringWindowStore::new();
        store.try_acquire("short", Duration::from_secs(1));
        store.try_acquire("long", Duration::from_secs(60));

        advance(Duration::from_secs(2)).await;
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.len(), 1);
        assert!(!store.try_acquire("long", Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_evicts_expired_entries() {
        let limiter = RateLimiter::start(RateLimitConfig {
            default_window: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(10),
        });

        assert!(limiter.allow("short-lived"));
        assert!(limiter.allow_with_window("long-lived", Duration::from_secs(60)));
        assert_eq!(limiter.tracked_identities(), 2);

        sleep(Duration::from_secs(11)).await;
        assert_eq!(limiter.tracked_identities(), 1);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(limiter.tracked_identities(), 0);

        limiter.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_before_interval() {
        let limiter = RateLimiter::start(RateLimitConfig {
            default_window: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(10),
        });
        assert!(limiter.allow("peer"));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(limiter.tracked_identities(), 1);

        limiter.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let limiter = RateLimiter::start(RateLimitConfig::default());
        assert!(!limiter.is_shut_down());

        limiter.shutdown().await;
        assert!(limiter.is_shut_down());

        // second call returns immediately
        limiter.shutdown().await;
        assert!(limiter.is_shut_down());

        // limiter keeps answering after the sweep is gone
        assert!(limiter.allow("peer"));
    }

    #[tokio::test]
    async fn test_stop_then_shutdown() {
        let store = Arc::new(ExpiringWindowStore::new());
        let sweep = SweepTask::start(store, Duration::from_millis(5));

        sweep.stop();
        sweep.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // task has already exited; must not block
        sweep.shutdown().await;
        sweep.shutdown().await;
        assert!(sweep.is_stopped());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_identities() {
        let limiter = Arc::new(RateLimiter::start(RateLimitConfig::default()));

        let mut handles = Vec::new();
        for i in 0..64 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                let identity = format!("10.0.0.{i}");
                let first = limiter.allow_with_window(&identity, Duration::from_secs(60));
                let second = limiter.allow_with_window(&identity, Duration::from_secs(60));
                (first, second)
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), (true, false));
        }
        assert_eq!(limiter.tracked_identities(), 64);

        limiter.shutdown().await;
    }

    #[test]
    fn test_threads_racing_on_one_identity_get_one_grant() {
        let store = Arc::new(ExpiringWindowStore::new());
        let barrier = Arc::new(Barrier::new(16));
        let granted = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                let granted = granted.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if store.try_acquire("shared", Duration::from_secs(60)) {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(granted.load(Ordering::SeqCst), 1);
    }
}
