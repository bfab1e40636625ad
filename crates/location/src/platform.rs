//! The platform capability boundary.
//!
//! Everything the service needs from the host OS (permission dialogs,
//! the positioning hardware, the geocoder backend) is expressed as the
//! [`Platform`] trait. The real mobile bindings, the CLI simulator, and
//! the test doubles all implement it.

use crate::config::{FixOptions, WatchOptions};
use crate::error::PlatformResult;
use crate::permission::{PermissionDecision, PermissionStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// A raw position reading as reported by the platform, before
/// normalization into a [`LocationSample`](crate::LocationSample).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Horizontal accuracy in meters, if reported
    pub accuracy: Option<f64>,
    /// Epoch milliseconds, platform clock
    pub timestamp_ms: i64,
}

/// One reverse-geocoding result. Any component may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    /// Building or point-of-interest name
    pub name: Option<String>,
    /// Street name
    pub street: Option<String>,
    /// District or neighborhood
    pub district: Option<String>,
    /// City
    pub city: Option<String>,
    /// Region or governorate
    pub region: Option<String>,
}

/// Opaque cancel token for a continuous-update subscription.
///
/// Owned exclusively by the tracking session; cancelling (or dropping)
/// tells the platform to stop emitting updates. Cancellation is
/// idempotent.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap a platform-specific cancellation action.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the subscription. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// A live continuous-position subscription: the update stream plus the
/// handle that cancels it.
#[derive(Debug)]
pub struct PositionWatch {
    /// Raw fixes in platform emission order
    pub updates: mpsc::Receiver<RawFix>,
    /// Cancel token for this subscription
    pub handle: SubscriptionHandle,
}

/// Host-platform positioning capability.
///
/// Implementations are expected to coalesce concurrent permission prompts
/// themselves; the service performs no extra locking around
/// `request_permissions`.
#[allow(async_fn_in_trait)]
pub trait Platform: Send + Sync {
    /// Query the current authorization without prompting.
    async fn check_permissions(&self) -> PlatformResult<PermissionStatus>;

    /// Show the native permission prompt and report the outcome.
    async fn request_permissions(&self) -> PlatformResult<PermissionDecision>;

    /// Acquire one fresh position fix.
    async fn get_once(&self, options: &FixOptions) -> PlatformResult<RawFix>;

    /// Install a continuous-position subscription.
    async fn watch(&self, options: &WatchOptions) -> PlatformResult<PositionWatch>;

    /// Reverse-geocode a coordinate. An empty vec means "no result".
    async fn reverse_geocode(&self, latitude: f64, longitude: f64)
        -> PlatformResult<Vec<Placemark>>;
}
