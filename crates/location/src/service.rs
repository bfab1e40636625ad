//! The proximity and location tracking service.
//!
//! One `LocationService` instance owns the last-known-position cache and
//! the (at most one) live tracking session. The UI asks it for one-shot
//! fixes, continuous updates, range checks, delivery estimates, and
//! display addresses; it never sees platform errors, only `None`/`false`/
//! fallback values plus the service's own prompts.

use crate::alerts::{AlertSink, UserAlert};
use crate::config::{FixOptions, WatchOptions};
use crate::geocode::{format_address, UNKNOWN_ADDRESS};
use crate::permission::PermissionGate;
use crate::platform::Platform;
use crate::sample::LocationSample;
use crate::tracking::TrackingSession;
use quickbite_geo::{delivery_estimate_minutes, distance_km, is_within_radius};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

/// Position service over a [`Platform`] capability and an [`AlertSink`].
///
/// The cache and session flag live on the instance, not in process
/// globals, so tests and tools can run independent services side by side.
/// Cache writes are last-write-wins between a one-shot fetch and a live
/// tracked stream; no timestamp reconciliation is attempted.
pub struct LocationService<P, A> {
    platform: Arc<P>,
    alerts: A,
    gate: PermissionGate<P>,
    fix_options: FixOptions,
    cache: Arc<RwLock<Option<LocationSample>>>,
    tracking: Arc<AtomicBool>,
    session: Mutex<TrackingSession>,
}

impl<P: Platform, A: AlertSink> LocationService<P, A> {
    /// Create a service with default one-shot fix options.
    pub fn new(platform: Arc<P>, alerts: A) -> Self {
        Self::with_options(platform, alerts, FixOptions::default())
    }

    /// Create a service with explicit one-shot fix options.
    pub fn with_options(platform: Arc<P>, alerts: A, fix_options: FixOptions) -> Self {
        Self {
            gate: PermissionGate::new(Arc::clone(&platform)),
            platform,
            alerts,
            fix_options,
            cache: Arc::new(RwLock::new(None)),
            tracking: Arc::new(AtomicBool::new(false)),
            session: Mutex::new(TrackingSession::new()),
        }
    }

    /// The permission gate, for callers that need to inspect or escalate
    /// authorization without requesting a position.
    pub fn permissions(&self) -> &PermissionGate<P> {
        &self.gate
    }

    // -------------------------------------------------------------------------
    // One-shot retrieval
    // -------------------------------------------------------------------------

    /// Acquire one fresh position fix.
    ///
    /// Escalates permission first; on denial shows the permission prompt
    /// and returns `None`. Platform failures show the position-error
    /// prompt and return `None`. A successful fix is cached as the
    /// last-known position before being returned.
    pub async fn current_location(&self) -> Option<LocationSample> {
        let decision = self.gate.request().await;
        if !decision.is_granted() {
            warn!(
                can_ask_again = decision.can_ask_again,
                "Position requested without permission"
            );
            self.alerts.show(UserAlert::PermissionRequired);
            return None;
        }

        match self.platform.get_once(&self.fix_options).await {
            Ok(fix) => {
                let sample = LocationSample::from(fix);
                self.write_cache(sample);
                debug!(
                    position = %sample.display_string(),
                    accuracy = ?sample.accuracy,
                    "Fresh position fix"
                );
                Some(sample)
            }
            Err(e) => {
                warn!(error = %e, "Failed to acquire position fix");
                self.alerts.show(UserAlert::PositionUnavailable);
                None
            }
        }
    }

    /// The most recent position from any source, without touching the
    /// hardware.
    pub fn cached_location(&self) -> Option<LocationSample> {
        *self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    // -------------------------------------------------------------------------
    // Continuous tracking
    // -------------------------------------------------------------------------

    /// Start continuous tracking with the default cadence (10 s, 50 m).
    pub async fn start_tracking<F>(&self, on_update: F) -> bool
    where
        F: FnMut(LocationSample) + Send + 'static,
    {
        self.start_tracking_with(WatchOptions::default(), on_update)
            .await
    }

    /// Start continuous tracking with explicit cadence options.
    ///
    /// Any already-live subscription is cancelled before the new one is
    /// installed, so two platform subscriptions never coexist. Updates are
    /// normalized, cached, and forwarded to `on_update` in platform
    /// emission order. Returns `false` on permission denial or
    /// installation failure.
    pub async fn start_tracking_with<F>(&self, options: WatchOptions, mut on_update: F) -> bool
    where
        F: FnMut(LocationSample) + Send + 'static,
    {
        if !self.gate.request().await.is_granted() {
            debug!("Tracking not started: permission denied");
            return false;
        }

        // Single-live-subscription invariant: tear down the previous
        // session before asking the platform for a new stream.
        {
            let mut session = self.lock_session();
            if session.is_active() {
                debug!("Cancelling previous tracking session");
                session.cancel_active();
                self.tracking.store(false, Ordering::SeqCst);
            }
        }

        let watch = match self.platform.watch(&options).await {
            Ok(watch) => watch,
            Err(e) => {
                warn!(error = %e, "Failed to install tracking subscription");
                return false;
            }
        };

        let mut session = self.lock_session();
        let my_generation = session.next_generation();
        let generation = session.generation();
        let cache = Arc::clone(&self.cache);
        let tracking = Arc::clone(&self.tracking);
        let mut updates = watch.updates;

        let forwarder = tokio::spawn(async move {
            while let Some(fix) = updates.recv().await {
                // A newer session or stop() supersedes this forwarder;
                // late platform callbacks must not reach the sink.
                if generation.load(Ordering::SeqCst) != my_generation {
                    break;
                }
                let sample = LocationSample::from(fix);
                *cache.write().unwrap_or_else(|e| e.into_inner()) = Some(sample);
                on_update(sample);
            }
            // Platform closed the stream on its own; only the current
            // session may clear the flag.
            if generation.load(Ordering::SeqCst) == my_generation {
                tracking.store(false, Ordering::SeqCst);
            }
        });

        session.install(watch.handle, forwarder);
        self.tracking.store(true, Ordering::SeqCst);
        info!(
            min_interval_ms = options.min_interval_ms,
            min_displacement_m = options.min_displacement_m,
            "Tracking session started"
        );
        true
    }

    /// Stop tracking. Unconditional and idempotent: safe to call from any
    /// call site whether or not a session is live.
    pub fn stop_tracking(&self) {
        let mut session = self.lock_session();
        if session.is_active() {
            session.cancel_active();
            debug!("Tracking session stopped");
        }
        self.tracking.store(false, Ordering::SeqCst);
    }

    /// Whether a tracking session is currently live.
    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Proximity queries against the cached position
    // -------------------------------------------------------------------------

    /// Whether the target lies within `max_km` (inclusive) of the cached
    /// position. `false` when no position has been cached yet; this never
    /// triggers an acquisition.
    pub fn is_within_range(&self, target_lat: f64, target_lon: f64, max_km: f64) -> bool {
        let Some(here) = self.cached_location() else {
            return false;
        };
        let distance = distance_km(here.latitude, here.longitude, target_lat, target_lon);
        is_within_radius(distance, max_km)
    }

    /// Estimated delivery time in minutes from the target to the cached
    /// position: travel at `avg_speed_kmh` plus fixed preparation time.
    /// `0` when no position has been cached yet.
    pub fn estimate_delivery_minutes(
        &self,
        target_lat: f64,
        target_lon: f64,
        avg_speed_kmh: f64,
    ) -> u32 {
        let Some(here) = self.cached_location() else {
            return 0;
        };
        let distance = distance_km(here.latitude, here.longitude, target_lat, target_lon);
        delivery_estimate_minutes(distance, avg_speed_kmh)
    }

    // -------------------------------------------------------------------------
    // Reverse geocoding
    // -------------------------------------------------------------------------

    /// Best-effort display address for a coordinate.
    ///
    /// Joins the non-empty placemark components in fixed order; any
    /// backend failure, empty, or malformed result resolves to
    /// [`UNKNOWN_ADDRESS`]. Never touches the position cache.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> String {
        match self.platform.reverse_geocode(latitude, longitude).await {
            Ok(placemarks) => format_address(&placemarks),
            Err(e) => {
                warn!(
                    error = %e,
                    latitude,
                    longitude,
                    "Reverse geocoding failed"
                );
                UNKNOWN_ADDRESS.to_string()
            }
        }
    }

    fn write_cache(&self, sample: LocationSample) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(sample);
    }

    fn lock_session(&self) -> MutexGuard<'_, TrackingSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlatformError, PlatformResult};
    use crate::permission::{PermissionDecision, PermissionStatus};
    use crate::platform::{Placemark, PositionWatch, RawFix, SubscriptionHandle};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const CAIRO: (f64, f64) = (30.0444, 31.2357);
    const ALEXANDRIA: (f64, f64) = (31.2001, 29.9187);

    fn fix(lat: f64, lon: f64, ts: i64) -> RawFix {
        RawFix {
            latitude: lat,
            longitude: lon,
            accuracy: Some(15.0),
            timestamp_ms: ts,
        }
    }

    enum FixScript {
        Fix(RawFix),
        Fail,
    }

    enum GeocodeScript {
        Places(Vec<Placemark>),
        Fail,
    }

    struct FakePlatform {
        status: Mutex<PermissionStatus>,
        check_fails: AtomicBool,
        prompt_outcome: Mutex<PermissionDecision>,
        prompt_calls: AtomicUsize,
        fix_script: Mutex<FixScript>,
        fix_calls: AtomicUsize,
        watch_installs: AtomicUsize,
        watch_cancels: Arc<AtomicUsize>,
        watch_fails: AtomicBool,
        watch_senders: Mutex<Vec<mpsc::Sender<RawFix>>>,
        geocode_script: Mutex<GeocodeScript>,
    }

    impl FakePlatform {
        fn granted() -> Self {
            Self {
                status: Mutex::new(PermissionStatus::Granted),
                check_fails: AtomicBool::new(false),
                prompt_outcome: Mutex::new(PermissionDecision::granted()),
                prompt_calls: AtomicUsize::new(0),
                fix_script: Mutex::new(FixScript::Fix(fix(CAIRO.0, CAIRO.1, 1_000))),
                fix_calls: AtomicUsize::new(0),
                watch_installs: AtomicUsize::new(0),
                watch_cancels: Arc::new(AtomicUsize::new(0)),
                watch_fails: AtomicBool::new(false),
                watch_senders: Mutex::new(Vec::new()),
                geocode_script: Mutex::new(GeocodeScript::Places(Vec::new())),
            }
        }

        fn denied() -> Self {
            let platform = Self::granted();
            *platform.status.lock().unwrap() = PermissionStatus::Denied;
            *platform.prompt_outcome.lock().unwrap() = PermissionDecision {
                status: PermissionStatus::Denied,
                can_ask_again: false,
            };
            platform
        }

        fn latest_sender(&self) -> mpsc::Sender<RawFix> {
            self.watch_senders.lock().unwrap().last().unwrap().clone()
        }
    }

    impl Platform for FakePlatform {
        async fn check_permissions(&self) -> PlatformResult<PermissionStatus> {
            if self.check_fails.load(Ordering::SeqCst) {
                return Err(PlatformError::backend("permission query crashed"));
            }
            Ok(*self.status.lock().unwrap())
        }

        async fn request_permissions(&self) -> PlatformResult<PermissionDecision> {
            self.prompt_calls.fetch_add(1, Ordering::SeqCst);
            Ok(*self.prompt_outcome.lock().unwrap())
        }

        async fn get_once(&self, _options: &FixOptions) -> PlatformResult<RawFix> {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            match &*self.fix_script.lock().unwrap() {
                FixScript::Fix(fix) => Ok(*fix),
                FixScript::Fail => Err(PlatformError::unavailable("no GPS signal")),
            }
        }

        async fn watch(&self, _options: &WatchOptions) -> PlatformResult<PositionWatch> {
            if self.watch_fails.load(Ordering::SeqCst) {
                return Err(PlatformError::backend("watch install failed"));
            }
            let (tx, rx) = mpsc::channel(16);
            self.watch_senders.lock().unwrap().push(tx);
            self.watch_installs.fetch_add(1, Ordering::SeqCst);

            let cancels = Arc::clone(&self.watch_cancels);
            Ok(PositionWatch {
                updates: rx,
                handle: SubscriptionHandle::new(move || {
                    cancels.fetch_add(1, Ordering::SeqCst);
                }),
            })
        }

        async fn reverse_geocode(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> PlatformResult<Vec<Placemark>> {
            match &*self.geocode_script.lock().unwrap() {
                GeocodeScript::Places(places) => Ok(places.clone()),
                GeocodeScript::Fail => Err(PlatformError::backend("geocoder down")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingAlerts {
        shown: Mutex<Vec<UserAlert>>,
    }

    impl AlertSink for RecordingAlerts {
        fn show(&self, alert: UserAlert) {
            self.shown.lock().unwrap().push(alert);
        }
    }

    fn service(
        platform: FakePlatform,
    ) -> (
        LocationService<FakePlatform, Arc<RecordingAlerts>>,
        Arc<FakePlatform>,
        Arc<RecordingAlerts>,
    ) {
        let platform = Arc::new(platform);
        let alerts = Arc::new(RecordingAlerts::default());
        let service = LocationService::new(Arc::clone(&platform), Arc::clone(&alerts));
        (service, platform, alerts)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    // -------------------------------------------------------------------------
    // One-shot retrieval
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_current_location_caches_fix() {
        let (service, _, alerts) = service(FakePlatform::granted());

        let sample = service.current_location().await.unwrap();
        assert_eq!(sample.latitude, CAIRO.0);
        assert_eq!(service.cached_location(), Some(sample));
        assert!(alerts.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_current_location_denied_shows_prompt() {
        let (service, platform, alerts) = service(FakePlatform::denied());

        assert_eq!(service.current_location().await, None);
        assert_eq!(
            alerts.shown.lock().unwrap().as_slice(),
            &[UserAlert::PermissionRequired]
        );
        // hardware is never touched without permission
        assert_eq!(platform.fix_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.cached_location(), None);
    }

    #[tokio::test]
    async fn test_current_location_platform_failure_shows_error_prompt() {
        let (service, _, alerts) = {
            let platform = FakePlatform::granted();
            *platform.fix_script.lock().unwrap() = FixScript::Fail;
            service(platform)
        };

        assert_eq!(service.current_location().await, None);
        assert_eq!(
            alerts.shown.lock().unwrap().as_slice(),
            &[UserAlert::PositionUnavailable]
        );
        assert_eq!(service.cached_location(), None);
    }

    #[tokio::test]
    async fn test_no_prompt_when_already_granted() {
        let (service, platform, _) = service(FakePlatform::granted());

        service.current_location().await.unwrap();
        assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_permission_check_never_fails() {
        let platform = FakePlatform::granted();
        platform.check_fails.store(true, Ordering::SeqCst);
        let (service, _, _) = service(platform);

        let decision = service.permissions().check_status().await;
        assert_eq!(decision.status, PermissionStatus::Denied);
        assert!(!decision.can_ask_again);
    }

    #[tokio::test]
    async fn test_gate_request_skips_prompt_when_granted() {
        let (service, platform, _) = service(FakePlatform::granted());

        let decision = service.permissions().request().await;
        assert!(decision.is_granted());
        assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prompt_fires_when_undetermined() {
        let platform = FakePlatform::granted();
        *platform.status.lock().unwrap() = PermissionStatus::Undetermined;
        let (service, platform, _) = service(platform);

        service.current_location().await.unwrap();
        assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 1);
    }

    // -------------------------------------------------------------------------
    // Continuous tracking
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_restart_cancels_previous_subscription() {
        let (service, platform, _) = service(FakePlatform::granted());

        assert!(service.start_tracking(|_| {}).await);
        assert!(service.start_tracking(|_| {}).await);

        assert_eq!(platform.watch_installs.load(Ordering::SeqCst), 2);
        assert_eq!(platform.watch_cancels.load(Ordering::SeqCst), 1);
        assert!(service.is_tracking());
    }

    #[tokio::test]
    async fn test_start_denied_installs_nothing() {
        let (service, platform, _) = service(FakePlatform::denied());

        assert!(!service.start_tracking(|_| {}).await);
        assert_eq!(platform.watch_installs.load(Ordering::SeqCst), 0);
        assert!(!service.is_tracking());
    }

    #[tokio::test]
    async fn test_start_reports_install_failure() {
        let platform = FakePlatform::granted();
        platform.watch_fails.store(true, Ordering::SeqCst);
        let (service, _, _) = service(platform);

        assert!(!service.start_tracking(|_| {}).await);
        assert!(!service.is_tracking());
    }

    #[tokio::test]
    async fn test_stop_tracking_is_idempotent() {
        let (service, platform, _) = service(FakePlatform::granted());

        // no session live: must not panic or change anything
        service.stop_tracking();
        assert!(!service.is_tracking());

        assert!(service.start_tracking(|_| {}).await);
        service.stop_tracking();
        assert!(!service.is_tracking());
        assert_eq!(platform.watch_cancels.load(Ordering::SeqCst), 1);

        service.stop_tracking();
        assert_eq!(platform.watch_cancels.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_updates_reach_sink_in_order_and_cache() {
        let (service, platform, _) = service(FakePlatform::granted());

        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        assert!(
            service
                .start_tracking(move |sample| log.lock().unwrap().push(sample))
                .await
        );

        let tx = platform.latest_sender();
        tx.send(fix(30.0, 31.0, 1_000)).await.unwrap();
        tx.send(fix(30.1, 31.1, 2_000)).await.unwrap();
        tx.send(fix(30.2, 31.2, 3_000)).await.unwrap();
        settle().await;

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 3);
        assert_eq!(
            received.iter().map(|s| s.timestamp_ms).collect::<Vec<_>>(),
            vec![1_000, 2_000, 3_000]
        );
        assert_eq!(service.cached_location().unwrap().timestamp_ms, 3_000);
    }

    #[tokio::test]
    async fn test_updates_after_stop_are_dropped() {
        let (service, platform, _) = service(FakePlatform::granted());

        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        assert!(
            service
                .start_tracking(move |sample| log.lock().unwrap().push(sample))
                .await
        );

        let tx = platform.latest_sender();
        tx.send(fix(30.0, 31.0, 1_000)).await.unwrap();
        settle().await;

        service.stop_tracking();
        // platform timing may still deliver a straggler after cancellation
        let _ = tx.send(fix(30.9, 31.9, 2_000)).await;
        settle().await;

        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(service.cached_location().unwrap().timestamp_ms, 1_000);
    }

    #[tokio::test]
    async fn test_flag_clears_when_platform_ends_stream() {
        let (service, platform, _) = service(FakePlatform::granted());

        assert!(service.start_tracking(|_| {}).await);
        assert!(service.is_tracking());

        platform.watch_senders.lock().unwrap().clear();
        settle().await;
        assert!(!service.is_tracking());
    }

    // -------------------------------------------------------------------------
    // Proximity queries
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_range_and_eta_without_cache() {
        let (service, _, _) = service(FakePlatform::granted());

        assert!(!service.is_within_range(CAIRO.0, CAIRO.1, 1_000.0));
        assert_eq!(service.estimate_delivery_minutes(CAIRO.0, CAIRO.1, 30.0), 0);
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_monotonic() {
        let (service, _, _) = service(FakePlatform::granted());
        service.current_location().await.unwrap();

        // cached at Cairo: Alexandria is ~180 km away
        assert!(!service.is_within_range(ALEXANDRIA.0, ALEXANDRIA.1, 3.0));
        assert!(service.is_within_range(ALEXANDRIA.0, ALEXANDRIA.1, 500.0));
        // exact distance counts as in-range
        let d = quickbite_geo::distance_km(CAIRO.0, CAIRO.1, ALEXANDRIA.0, ALEXANDRIA.1);
        assert!(service.is_within_range(ALEXANDRIA.0, ALEXANDRIA.1, d));
        // same point is always in range
        assert!(service.is_within_range(CAIRO.0, CAIRO.1, 0.0));
    }

    #[tokio::test]
    async fn test_eta_at_zero_distance_is_preparation_time() {
        let (service, _, _) = service(FakePlatform::granted());
        service.current_location().await.unwrap();

        assert_eq!(
            service.estimate_delivery_minutes(CAIRO.0, CAIRO.1, 30.0),
            quickbite_geo::PREPARATION_MINUTES
        );
    }

    #[tokio::test]
    async fn test_eta_decreases_with_speed() {
        let (service, _, _) = service(FakePlatform::granted());
        service.current_location().await.unwrap();

        let slow = service.estimate_delivery_minutes(ALEXANDRIA.0, ALEXANDRIA.1, 20.0);
        let fast = service.estimate_delivery_minutes(ALEXANDRIA.0, ALEXANDRIA.1, 60.0);
        assert!(slow > fast, "slow={slow} fast={fast}");
    }

    // -------------------------------------------------------------------------
    // Reverse geocoding
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_geocode_joins_components() {
        let platform = FakePlatform::granted();
        *platform.geocode_script.lock().unwrap() = GeocodeScript::Places(vec![Placemark {
            name: Some("Building 123".into()),
            street: None,
            district: Some("Downtown".into()),
            city: Some("Cairo".into()),
            region: None,
        }]);
        let (service, _, _) = service(platform);

        assert_eq!(
            service.reverse_geocode(CAIRO.0, CAIRO.1).await,
            "Building 123, Downtown, Cairo"
        );
    }

    #[tokio::test]
    async fn test_geocode_failures_resolve_to_placeholder() {
        // empty result
        let (service, platform, _) = service(FakePlatform::granted());
        assert_eq!(service.reverse_geocode(CAIRO.0, CAIRO.1).await, UNKNOWN_ADDRESS);

        // backend error
        *platform.geocode_script.lock().unwrap() = GeocodeScript::Fail;
        assert_eq!(service.reverse_geocode(CAIRO.0, CAIRO.1).await, UNKNOWN_ADDRESS);

        // geocoding never populates the position cache
        assert_eq!(service.cached_location(), None);
    }
}
