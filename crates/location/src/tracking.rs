//! Tracking session bookkeeping.
//!
//! At most one continuous subscription may be live per service instance.
//! The session owns the platform's cancel handle and the forwarder task
//! that drains the update stream; a generation counter stamps each
//! forwarder so updates arriving after cancellation are dropped instead of
//! reaching the sink.

use crate::platform::SubscriptionHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// State of the (at most one) live tracking subscription.
pub(crate) struct TrackingSession {
    generation: Arc<AtomicU64>,
    active: Option<ActiveWatch>,
}

struct ActiveWatch {
    handle: SubscriptionHandle,
    forwarder: JoinHandle<()>,
}

impl TrackingSession {
    pub(crate) fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            active: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Shared generation counter, read by forwarder tasks to detect that
    /// their session has been cancelled.
    pub(crate) fn generation(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }

    /// Start a new session generation. Any still-running forwarder sees
    /// the bump and stops delivering.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Cancel the live subscription, if any. Invalidates the platform
    /// handle first so no further updates are produced, then tears down
    /// the forwarder. Idempotent.
    pub(crate) fn cancel_active(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(mut watch) = self.active.take() {
            watch.handle.cancel();
            watch.forwarder.abort();
        }
    }

    /// Install a freshly created subscription as the live session.
    ///
    /// Callers cancel the previous session before creating a new watch,
    /// but two starts suspended at the platform install can both reach
    /// this point; any watch still live here is cancelled so two platform
    /// subscriptions never coexist.
    pub(crate) fn install(&mut self, handle: SubscriptionHandle, forwarder: JoinHandle<()>) {
        if let Some(mut replaced) = self.active.replace(ActiveWatch { handle, forwarder }) {
            replaced.handle.cancel();
            replaced.forwarder.abort();
        }
    }
}
