//! Proximity and location tracking service for QuickBite.
//!
//! This crate owns everything between the platform positioning primitives
//! and the ordering UI:
//! - Permission checks and prompts ([`PermissionGate`])
//! - One-shot position fixes and continuous tracking ([`LocationService`])
//! - Range and delivery-time queries against the cached position
//! - Best-effort reverse geocoding with a fixed fallback address
//!
//! The platform itself (GPS hardware, permission dialogs, geocoder backend)
//! is abstracted behind the [`Platform`] trait so the service can run
//! against the real mobile bindings, the simulator in `qb-locsim`, or test
//! doubles.
//!
//! Every public operation is total: permission and hardware failures are
//! logged and surfaced to the user through an [`AlertSink`], never as
//! errors to the caller.

mod alerts;
mod config;
mod error;
mod geocode;
mod permission;
mod platform;
mod sample;
mod service;
mod tracking;

pub use alerts::{AlertSink, LogAlerts, UserAlert};
pub use config::{FixOptions, WatchOptions};
pub use error::{PlatformError, PlatformResult};
pub use geocode::UNKNOWN_ADDRESS;
pub use permission::{PermissionDecision, PermissionGate, PermissionStatus};
pub use platform::{Placemark, Platform, PositionWatch, RawFix, SubscriptionHandle};
pub use sample::LocationSample;
pub use service::LocationService;
