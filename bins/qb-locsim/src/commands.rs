//! Subcommand implementations.

use crate::sim::{SimConfig, SimPlatform};
use anyhow::Result;
use owo_colors::OwoColorize;
use quickbite_geo::{delivery_estimate_minutes, distance_km, is_within_radius, Coordinate};
use quickbite_location::{AlertSink, LocationService, LogAlerts, UserAlert, WatchOptions};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Renders the service's prompts on stderr, standing in for the mobile
/// alert dialogs.
struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn show(&self, alert: UserAlert) {
        eprintln!("{} {}", alert.title().red().bold(), alert.message());
    }
}

pub fn distance(from: Coordinate, to: Coordinate, json: bool) -> Result<()> {
    let km = distance_km(from.latitude, from.longitude, to.latitude, to.longitude);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "from": from,
                "to": to,
                "distance_km": km,
            })
        );
    } else {
        println!("{} {}", format!("{km} km").green().bold(), "great-circle".dimmed());
    }
    Ok(())
}

pub fn eta(from: Coordinate, to: Coordinate, speed: f64) -> Result<()> {
    let km = distance_km(from.latitude, from.longitude, to.latitude, to.longitude);
    let minutes = delivery_estimate_minutes(km, speed);

    println!(
        "{} {}",
        format!("~{minutes} min").green().bold(),
        format!("({km} km at {speed} km/h + preparation)").dimmed()
    );
    Ok(())
}

pub fn range(from: Coordinate, to: Coordinate, radius: f64) -> Result<()> {
    let km = distance_km(from.latitude, from.longitude, to.latitude, to.longitude);

    if is_within_radius(km, radius) {
        println!(
            "{} {}",
            "in range".green().bold(),
            format!("({km} km <= {radius} km)").dimmed()
        );
    } else {
        println!(
            "{} {}",
            "out of range".yellow().bold(),
            format!("({km} km > {radius} km)").dimmed()
        );
    }
    Ok(())
}

pub async fn locate(at: Coordinate, deny: bool, offline: bool) -> Result<()> {
    let mut config = SimConfig::stationary(at);
    config.deny_permission = deny;
    config.offline = offline;

    let platform = Arc::new(SimPlatform::new(config));
    let service = LocationService::new(platform, TerminalAlerts);

    match service.current_location().await {
        Some(sample) => {
            println!("{} {}", "position:".bold(), sample.display_string().cyan());
            if let Some(accuracy) = sample.accuracy {
                println!("{} ±{accuracy} m", "accuracy:".bold());
            }
            let address = service.reverse_geocode(sample.latitude, sample.longitude).await;
            println!("{} {address}", "address:".bold());
        }
        None => {
            println!("{}", "no position fix".yellow());
        }
    }
    Ok(())
}

pub async fn track(from: Coordinate, to: Coordinate, steps: u32, interval_ms: u64) -> Result<()> {
    let platform = Arc::new(SimPlatform::new(SimConfig {
        from,
        to,
        steps,
        accuracy_m: 12.0,
        deny_permission: false,
        offline: false,
    }));
    let service = LocationService::new(platform, TerminalAlerts);

    let updates = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&updates);
    let options = WatchOptions {
        min_interval_ms: interval_ms,
        ..WatchOptions::default()
    };

    println!(
        "{} {},{} -> {},{} ({steps} updates)",
        "tracking".bold(),
        from.latitude,
        from.longitude,
        to.latitude,
        to.longitude
    );

    let started = service
        .start_tracking_with(options, move |sample| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  {} {}", format!("#{n}").dimmed(), sample.display_string().cyan());
        })
        .await;
    if !started {
        anyhow::bail!("tracking session failed to start");
    }

    // the simulated route ends on its own once all updates are emitted
    while service.is_tracking() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    service.stop_tracking();

    let Some(last) = service.cached_location() else {
        anyhow::bail!("route produced no position updates");
    };
    let travelled = distance_km(from.latitude, from.longitude, last.latitude, last.longitude);
    let address = service.reverse_geocode(last.latitude, last.longitude).await;

    println!(
        "{} {} updates, {travelled} km travelled",
        "done:".green().bold(),
        updates.load(Ordering::SeqCst)
    );
    println!("{} {address}", "final address:".bold());
    Ok(())
}

pub async fn geocode(at: Coordinate) -> Result<()> {
    let platform = Arc::new(SimPlatform::new(SimConfig::stationary(at)));
    let service = LocationService::new(platform, LogAlerts);

    let address = service.reverse_geocode(at.latitude, at.longitude).await;
    println!("{address}");
    Ok(())
}
