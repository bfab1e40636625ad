//! Cadence options for position retrieval.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for a one-shot position fix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixOptions {
    /// Reject cached platform fixes older than this, in milliseconds
    pub max_age_ms: u64,
    /// Minimum movement in meters before the platform may reuse a fix
    pub min_displacement_m: f64,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            max_age_ms: 5_000,
            min_displacement_m: 10.0,
        }
    }
}

impl FixOptions {
    /// Staleness window as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

/// Options for a continuous tracking subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Minimum interval between updates, in milliseconds
    pub min_interval_ms: u64,
    /// Minimum displacement between updates, in meters
    pub min_displacement_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            min_interval_ms: 10_000,
            min_displacement_m: 50.0,
        }
    }
}

impl WatchOptions {
    /// Update interval as a [`Duration`].
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}
