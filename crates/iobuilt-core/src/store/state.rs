// ── Store state primitives ──
//
// Building blocks shared by every store: a watch-backed observable value,
// an RAII loading flag, a bounded error log, and a request fence.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

use crate::error::CoreError;
use crate::stream::StateStream;

// ── Observable ───────────────────────────────────────────────────────

/// A value published through a `watch` channel. Writes never fail, even
/// with no subscribers.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> StateStream<T> {
        StateStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// ── Loading flag ─────────────────────────────────────────────────────

/// Published `loading` flag. Nested actions share it: the flag drops back
/// to `false` only when the outermost guard is released.
#[derive(Debug, Default)]
pub struct LoadingFlag {
    depth: AtomicUsize,
    state: Observable<bool>,
}

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag for the lifetime of the returned guard.
    pub fn guard(&self) -> LoadingGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.state.set(true);
        LoadingGuard { flag: self }
    }

    pub fn is_loading(&self) -> bool {
        self.state.get()
    }

    pub fn subscribe(&self) -> StateStream<bool> {
        self.state.subscribe()
    }
}

/// Clears its `LoadingFlag` on drop, on every exit path.
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.flag.depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.flag.state.set(false);
        }
    }
}

// ── Error log ────────────────────────────────────────────────────────

pub const DEFAULT_ERROR_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub error: CoreError,
    /// The action that failed, e.g. `"fetch_projects"`.
    pub action: &'static str,
    pub at: DateTime<Utc>,
    pub acknowledged: bool,
}

/// Ring buffer of recent store errors. The oldest entry is evicted once
/// capacity is reached.
#[derive(Debug)]
pub struct ErrorLog {
    capacity: usize,
    entries: Mutex<VecDeque<ErrorEntry>>,
    unacknowledged: Observable<usize>,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ERROR_CAPACITY)
    }
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of 0 is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            unacknowledged: Observable::new(0),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, VecDeque<ErrorEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, entries: &VecDeque<ErrorEntry>) {
        self.unacknowledged
            .set(entries.iter().filter(|e| !e.acknowledged).count());
    }

    /// Log and store a failure.
    pub fn record(&self, action: &'static str, error: CoreError) {
        warn!(action, error = %error, "store action failed");
        let mut entries = self.entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ErrorEntry {
            error,
            action,
            at: Utc::now(),
            acknowledged: false,
        });
        self.publish(&entries);
    }

    /// Record a failure and hand it back for propagation.
    pub fn capture(&self, action: &'static str, error: impl Into<CoreError>) -> CoreError {
        let error = error.into();
        self.record(action, error.clone());
        error
    }

    pub fn last(&self) -> Option<CoreError> {
        self.entries().back().map(|e| e.error.clone())
    }

    /// Oldest first.
    pub fn all(&self) -> Vec<ErrorEntry> {
        self.entries().iter().cloned().collect()
    }

    /// Mark every entry as seen.
    pub fn acknowledge(&self) {
        let mut entries = self.entries();
        for entry in entries.iter_mut() {
            entry.acknowledged = true;
        }
        self.publish(&entries);
    }

    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.clear();
        self.publish(&entries);
    }

    /// Number of entries not yet acknowledged.
    pub fn unacknowledged(&self) -> usize {
        self.unacknowledged.get()
    }

    pub fn subscribe_unacknowledged(&self) -> StateStream<usize> {
        self.unacknowledged.subscribe()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ── Request fence ────────────────────────────────────────────────────

/// Issued per dispatched request; compare with `RequestFence::is_current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic counter discarding responses that arrive after a newer
/// request of the same kind was dispatched.
#[derive(Debug, Default)]
pub struct RequestFence {
    latest: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn err(n: usize) -> CoreError {
        CoreError::Internal(format!("e{n}"))
    }

    #[test]
    fn observable_publishes_to_subscribers() {
        let value = Observable::new(1);
        let stream = value.subscribe();
        value.set(2);
        assert_eq!(*stream.current(), 1);
        assert_eq!(stream.latest(), 2);
        value.update(|v| *v += 1);
        assert_eq!(value.get(), 3);
    }

    #[tokio::test]
    async fn state_stream_sees_changes() {
        let value = Observable::new(String::new());
        let mut stream = value.subscribe();
        value.set("next".into());
        assert_eq!(stream.changed().await.as_deref(), Some("next"));
        assert_eq!(stream.current(), "next");
    }

    #[test]
    fn stream_yields_current_then_changes() {
        use futures_util::StreamExt;

        let flag = LoadingFlag::new();
        let mut stream = flag.subscribe().into_stream();
        tokio_test::block_on(async {
            assert_eq!(stream.next().await, Some(false));
            let _guard = flag.guard();
            assert_eq!(stream.next().await, Some(true));
        });
    }

    #[test]
    fn loading_guard_resets_on_drop() {
        let flag = LoadingFlag::new();
        {
            let _outer = flag.guard();
            assert!(flag.is_loading());
            {
                let _inner = flag.guard();
                assert!(flag.is_loading());
            }
            assert!(flag.is_loading(), "inner guard must not clear outer");
        }
        assert!(!flag.is_loading());
    }

    #[test]
    fn loading_guard_resets_on_early_return() {
        fn fails(flag: &LoadingFlag) -> Result<(), CoreError> {
            let _guard = flag.guard();
            Err(CoreError::Timeout)?;
            Ok(())
        }
        let flag = LoadingFlag::new();
        assert!(fails(&flag).is_err());
        assert!(!flag.is_loading());
    }

    #[test]
    fn error_log_is_bounded() {
        let log = ErrorLog::with_capacity(3);
        for n in 0..5 {
            log.record("test", err(n));
        }
        let kept: Vec<_> = log.all().into_iter().map(|e| e.error).collect();
        assert_eq!(kept, vec![err(2), err(3), err(4)]);
        assert_eq!(log.last(), Some(err(4)));
        assert_eq!(log.capacity(), 3);
    }

    #[test]
    fn default_capacity_is_sixteen() {
        let log = ErrorLog::new();
        for n in 0..20 {
            log.record("test", err(n));
        }
        assert_eq!(log.len(), DEFAULT_ERROR_CAPACITY);
    }

    #[test]
    fn acknowledge_and_clear() {
        let log = ErrorLog::new();
        log.record("a", err(1));
        log.record("b", err(2));
        assert_eq!(log.unacknowledged(), 2);

        log.acknowledge();
        assert_eq!(log.unacknowledged(), 0);
        assert_eq!(log.len(), 2);

        log.record("c", err(3));
        assert_eq!(log.unacknowledged(), 1);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.unacknowledged(), 0);
        assert!(log.last().is_none());
    }

    #[test]
    fn fence_only_latest_ticket_is_current() {
        let fence = RequestFence::new();
        let first = fence.ticket();
        assert!(fence.is_current(first));
        let second = fence.ticket();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
    }
}
