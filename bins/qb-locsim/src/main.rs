//! QuickBite location simulator.
//!
//! Exercises the proximity and tracking service against a simulated
//! platform: distance and ETA queries, one-shot fixes, tracked courier
//! routes, and reverse geocoding, all from the terminal.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use quickbite_geo::{Coordinate, DEFAULT_RANGE_KM, DEFAULT_SPEED_KMH};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod sim;

/// Location service simulator for QuickBite
#[derive(Parser)]
#[command(name = "qb-locsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two coordinates
    Distance {
        /// Origin as "lat,lon"
        #[arg(long)]
        from: Coordinate,

        /// Target as "lat,lon"
        #[arg(long)]
        to: Coordinate,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Estimated delivery time from a restaurant to a customer
    Eta {
        /// Customer position as "lat,lon"
        #[arg(long)]
        from: Coordinate,

        /// Restaurant position as "lat,lon"
        #[arg(long)]
        to: Coordinate,

        /// Average courier speed in km/h
        #[arg(long, default_value_t = DEFAULT_SPEED_KMH)]
        speed: f64,
    },

    /// Check whether a restaurant delivers to a position
    Range {
        /// Customer position as "lat,lon"
        #[arg(long)]
        from: Coordinate,

        /// Restaurant position as "lat,lon"
        #[arg(long)]
        to: Coordinate,

        /// Delivery radius in kilometers
        #[arg(long, default_value_t = DEFAULT_RANGE_KM)]
        radius: f64,
    },

    /// One-shot position fix through the full service pipeline
    Locate {
        /// Simulated device position as "lat,lon"
        #[arg(long)]
        at: Coordinate,

        /// Simulate the user refusing the permission prompt
        #[arg(long)]
        deny: bool,

        /// Simulate dead positioning hardware
        #[arg(long)]
        offline: bool,
    },

    /// Simulate a courier route through a tracking session
    Track {
        /// Route start as "lat,lon"
        #[arg(long)]
        from: Coordinate,

        /// Route end as "lat,lon"
        #[arg(long)]
        to: Coordinate,

        /// Number of position updates along the route
        #[arg(long, default_value_t = 5)]
        steps: u32,

        /// Milliseconds between updates
        #[arg(long, default_value_t = 1_000)]
        interval_ms: u64,
    },

    /// Reverse-geocode a coordinate against the simulator fixtures
    Geocode {
        /// Position as "lat,lon"
        at: Coordinate,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Distance { from, to, json } => commands::distance(from, to, json),
        Commands::Eta { from, to, speed } => commands::eta(from, to, speed),
        Commands::Range { from, to, radius } => commands::range(from, to, radius),
        Commands::Locate { at, deny, offline } => commands::locate(at, deny, offline).await,
        Commands::Track {
            from,
            to,
            steps,
            interval_ms,
        } => commands::track(from, to, steps, interval_ms).await,
        Commands::Geocode { at } => commands::geocode(at).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
