//! Positioning authorization.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization state reported by the platform.
///
/// Never persisted; re-derived from the platform on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// The user has granted positioning access
    Granted,
    /// The user has denied positioning access
    Denied,
    /// The user has not been asked yet
    Undetermined,
}

/// Outcome of a permission check or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    /// Current authorization status
    pub status: PermissionStatus,
    /// Whether prompting again can change the answer; platforms may
    /// permanently deny and forbid re-prompting
    pub can_ask_again: bool,
}

impl PermissionDecision {
    /// A granted decision.
    pub fn granted() -> Self {
        Self {
            status: PermissionStatus::Granted,
            can_ask_again: true,
        }
    }

    /// A terminal denial: prompting again will not help.
    pub fn denied_permanently() -> Self {
        Self {
            status: PermissionStatus::Denied,
            can_ask_again: false,
        }
    }

    /// True when positioning access is authorized.
    #[inline]
    pub fn is_granted(&self) -> bool {
        self.status == PermissionStatus::Granted
    }
}

/// Queries and escalates positioning authorization.
///
/// The gate never fails: platform errors during check or prompt are logged
/// and reported as a permanent denial.
pub struct PermissionGate<P> {
    platform: Arc<P>,
}

impl<P: Platform> PermissionGate<P> {
    /// Create a gate over a platform capability.
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Current authorization, without prompting the user.
    pub async fn check_status(&self) -> PermissionDecision {
        match self.platform.check_permissions().await {
            // only a prompt outcome can report a permanent denial
            Ok(status) => PermissionDecision {
                status,
                can_ask_again: true,
            },
            Err(e) => {
                warn!(error = %e, "Permission check failed, treating as denied");
                PermissionDecision::denied_permanently()
            }
        }
    }

    /// Request positioning authorization, prompting at most once.
    ///
    /// Returns immediately when access is already granted, so repeated
    /// calls never stack native prompts. Concurrent in-flight prompts are
    /// assumed to be coalesced by the platform itself.
    pub async fn request(&self) -> PermissionDecision {
        let existing = self.check_status().await;
        if existing.is_granted() {
            return PermissionDecision::granted();
        }

        match self.platform.request_permissions().await {
            Ok(decision) => {
                debug!(status = ?decision.status, can_ask_again = decision.can_ask_again, "Permission prompt resolved");
                decision
            }
            Err(e) => {
                warn!(error = %e, "Permission request failed, treating as denied");
                PermissionDecision::denied_permanently()
            }
        }
    }
}
