//! Fleet-wide scheduling lock.
//!
//! A single exclusive token guarding the allocate-and-dispatch sequence.
//! Waiters poll at a fixed interval and never time out; the holder gets a
//! [`LockRelease`] handle which frees the token exactly once, either through
//! [`LockRelease::release`] or when the handle is dropped on an error path.
//!
//! ```rust,ignore
//! let lock = SchedulerLock::new(Duration::from_secs(1));
//! let release = lock.acquire("batch-n00dles").await;
//! // allocate + dispatch
//! release.release();
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::util::time::format_duration_ms;

/// Exclusive token shared by every scheduling caller of one fleet.
#[derive(Debug, Clone)]
pub struct SchedulerLock {
    /// Label of the current holder, `None` when free.
    holder: Arc<Mutex<Option<String>>>,
    poll_interval: Duration,
}

impl SchedulerLock {
    /// Create a free lock polled at `poll_interval` by waiters.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            holder: Arc::new(Mutex::new(None)),
            poll_interval,
        }
    }

    /// Interval between acquisition attempts while waiting.
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether some caller currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    /// Label of the current holder.
    pub fn holder(&self) -> Option<String> {
        self.holder.lock().clone()
    }

    /// Take the lock if it is free, without waiting.
    pub fn try_acquire(&self, label: &str) -> Option<LockRelease> {
        let mut holder = self.holder.lock();
        if holder.is_some() {
            return None;
        }
        *holder = Some(label.to_string());
        tracing::debug!(handle = label, "scheduler lock acquired");
        Some(LockRelease {
            holder: Arc::clone(&self.holder),
            label: label.to_string(),
            released: false,
        })
    }

    /// Wait until the lock is free and take it.
    ///
    /// Polls every `poll_interval`. There is no timeout: a holder that never
    /// releases blocks every later caller.
    pub async fn acquire(&self, label: &str) -> LockRelease {
        if let Some(release) = self.try_acquire(label) {
            return release;
        }

        let start = Instant::now();
        tracing::warn!(handle = label, holder = ?self.holder(), "scheduler is locked");
        loop {
            tokio::time::sleep(self.poll_interval).await;
            if let Some(release) = self.try_acquire(label) {
                let waited = start.elapsed();
                tracing::warn!(
                    handle = label,
                    wait_duration = %format_duration_ms(waited.as_secs_f64() * 1000.0),
                    "scheduler lock released"
                );
                return release;
            }
        }
    }
}

/// Proof of lock ownership. Frees the lock exactly once.
#[derive(Debug)]
#[must_use = "dropping the handle releases the scheduler lock immediately"]
pub struct LockRelease {
    holder: Arc<Mutex<Option<String>>>,
    label: String,
    released: bool,
}

impl LockRelease {
    /// Label the lock was acquired with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Release the lock. Consumes the handle so it cannot run twice.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut holder = self.holder.lock();
        if holder.as_deref() == Some(self.label.as_str()) {
            *holder = None;
            tracing::debug!(handle = %self.label, "scheduler lock released");
        }
    }
}

impl Drop for LockRelease {
    fn drop(&mut self) {
        self.release_inner();
    }
}
