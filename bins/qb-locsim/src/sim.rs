//! Simulated positioning platform.
//!
//! Stands in for the mobile bindings so the full service pipeline
//! (permission gate, one-shot fixes, tracking sessions, geocoding) can be
//! exercised from the terminal. Tracked routes are linear interpolations
//! between two coordinates; the geocoder knows a handful of Egyptian
//! fixtures and returns nothing elsewhere.

use chrono::Utc;
use quickbite_geo::{distance_km, Coordinate};
use quickbite_location::{
    FixOptions, PermissionDecision, PermissionStatus, Placemark, Platform, PlatformError,
    PlatformResult, PositionWatch, RawFix, SubscriptionHandle, WatchOptions,
};
use tokio::sync::mpsc;
use tracing::debug;

/// How the simulated platform behaves.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Starting coordinate for fixes and routes
    pub from: Coordinate,
    /// End of the simulated route (tracking only)
    pub to: Coordinate,
    /// Number of interpolated updates along the route
    pub steps: u32,
    /// Reported horizontal accuracy in meters
    pub accuracy_m: f64,
    /// Refuse permission, as a user tapping "Don't allow" would
    pub deny_permission: bool,
    /// Simulate dead hardware: every fix and watch install fails
    pub offline: bool,
}

impl SimConfig {
    pub fn stationary(at: Coordinate) -> Self {
        Self {
            from: at,
            to: at,
            steps: 0,
            accuracy_m: 12.0,
            deny_permission: false,
            offline: false,
        }
    }
}

/// A [`Platform`] backed by the simulation config instead of hardware.
pub struct SimPlatform {
    config: SimConfig,
}

impl SimPlatform {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    fn fix_at(&self, step: u32) -> RawFix {
        let t = if self.config.steps == 0 {
            0.0
        } else {
            f64::from(step) / f64::from(self.config.steps)
        };
        let from = self.config.from;
        let to = self.config.to;
        RawFix {
            latitude: from.latitude + (to.latitude - from.latitude) * t,
            longitude: from.longitude + (to.longitude - from.longitude) * t,
            accuracy: Some(self.config.accuracy_m),
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

impl Platform for SimPlatform {
    async fn check_permissions(&self) -> PlatformResult<PermissionStatus> {
        Ok(if self.config.deny_permission {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Undetermined
        })
    }

    async fn request_permissions(&self) -> PlatformResult<PermissionDecision> {
        Ok(if self.config.deny_permission {
            PermissionDecision {
                status: PermissionStatus::Denied,
                can_ask_again: false,
            }
        } else {
            PermissionDecision::granted()
        })
    }

    async fn get_once(&self, options: &FixOptions) -> PlatformResult<RawFix> {
        if self.config.offline {
            return Err(PlatformError::Timeout(options.max_age()));
        }
        Ok(self.fix_at(0))
    }

    async fn watch(&self, options: &WatchOptions) -> PlatformResult<PositionWatch> {
        if self.config.offline {
            return Err(PlatformError::unavailable("simulated hardware offline"));
        }

        let (tx, rx) = mpsc::channel(16);
        let interval = options.min_interval();
        let steps = self.config.steps;
        let fixes: Vec<RawFix> = (0..=steps).map(|i| self.fix_at(i)).collect();

        let emitter = tokio::spawn(async move {
            for fix in fixes {
                tokio::time::sleep(interval).await;
                if tx.send(fix).await.is_err() {
                    break;
                }
            }
            debug!("Simulated route complete");
        });

        Ok(PositionWatch {
            updates: rx,
            handle: SubscriptionHandle::new(move || emitter.abort()),
        })
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> PlatformResult<Vec<Placemark>> {
        if self.config.offline {
            return Err(PlatformError::backend("simulated geocoder offline"));
        }
        Ok(lookup_fixture(latitude, longitude))
    }
}

/// Offline geocoding fixtures: city centers the simulator recognizes.
const FIXTURES: &[(f64, f64, &str, &str, &str)] = &[
    (30.0444, 31.2357, "Downtown", "Cairo", "Cairo Governorate"),
    (31.2001, 29.9187, "Raml Station", "Alexandria", "Alexandria Governorate"),
    (30.0131, 31.2089, "Giza", "Giza", "Giza Governorate"),
];

fn lookup_fixture(latitude: f64, longitude: f64) -> Vec<Placemark> {
    FIXTURES
        .iter()
        .find(|(lat, lon, ..)| distance_km(latitude, longitude, *lat, *lon) <= 15.0)
        .map(|(_, _, district, city, region)| {
            vec![Placemark {
                name: None,
                street: None,
                district: Some((*district).to_string()),
                city: Some((*city).to_string()),
                region: Some((*region).to_string()),
            }]
        })
        .unwrap_or_default()
}
