//! Discover a Bluebox and print its identity and telemetry.
//!
//! # Usage
//!
//! ```sh
//! # Wait up to 5 seconds for a device
//! cargo run --example bluebox_info
//!
//! # Wait forever
//! cargo run --example bluebox_info -- --wait
//! ```

use bluebox::{list_devices, Bluebox, Config};
use std::process;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let wait = std::env::args().any(|arg| arg == "--wait");

    if let Err(e) = run(wait) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(wait: bool) -> Result<(), Box<dyn std::error::Error>> {
    for device in list_devices()? {
        println!("Found Bluebox: {}", device);
    }

    let timeout = if wait {
        None
    } else {
        Some(Duration::from_secs(5))
    };
    let config = Config::default().with_discovery_timeout(timeout);
    let mut radio = Bluebox::open_with(&config)?;

    println!("Manufacturer: {}", radio.manufacturer());
    println!("Product:      {}", radio.product());
    println!("Serial:       {}", radio.serial());

    match radio.read_version() {
        Ok(version) => println!("Version:      0x{:04x}", version),
        Err(e) => {
            tracing::warn!("Failed to read version: {}", e);
            println!("Version:      (not found)");
        }
    }

    match radio.read_rssi() {
        Ok(dbm) => println!("RSSI:         {} dBm", dbm),
        Err(e) => {
            tracing::warn!("Failed to read RSSI: {}", e);
            println!("RSSI:         (not found)");
        }
    }

    radio.close();
    Ok(())
}
