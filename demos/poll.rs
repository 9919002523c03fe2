//! Example: Polling the i-regul server
//!
//! Run with:
//!
//! ```text
//! IREGUL_ID=123456 IREGUL_PASSWORD=secret RUST_LOG=iregul=debug cargo run --example poll
//! ```
//!
//! This example demonstrates:
//! - Driving `refresh` from an external timer
//! - Reading named values from the sensor catalog
//! - Telling transient errors apart from rejected credentials
//!
//! `IREGUL_SCAN_INTERVAL` sets the interval in seconds (default 300).

use std::time::Duration;

use iregul::{BinarySensor, Client, ClientConfig, Error, Sensor};

const DEFAULT_SCAN_INTERVAL: u64 = 300;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let (Ok(id), Ok(password)) = (std::env::var("IREGUL_ID"), std::env::var("IREGUL_PASSWORD"))
    else {
        eprintln!("IREGUL_ID and IREGUL_PASSWORD must be set");
        std::process::exit(1);
    };

    let interval = std::env::var("IREGUL_SCAN_INTERVAL")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_SCAN_INTERVAL);

    let client = Client::new(ClientConfig::new(id, password));
    let mut timer = tokio::time::interval(Duration::from_secs(interval));

    loop {
        timer.tick().await;

        match client.refresh().await {
            Ok(()) => print_readings(&client),
            Err(Error::Authentication) => {
                eprintln!("credentials rejected, stopping");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("refresh failed: {e}");
                // Previous readings stay available.
                print_readings(&client);
            }
        }
    }
}

fn print_readings(client: &Client) {
    println!("=== Readings ===");

    for sensor in Sensor::ALL {
        match client.get_value(sensor.id()) {
            Ok(value) => println!("{sensor:?}: {value}"),
            Err(_) => println!("{sensor:?}: unavailable"),
        }
    }

    for sensor in BinarySensor::ALL {
        match client.get_bool(sensor.id()) {
            Ok(true) => println!("{sensor:?}: on"),
            Ok(false) => println!("{sensor:?}: off"),
            Err(_) => println!("{sensor:?}: unavailable"),
        }
    }
}
