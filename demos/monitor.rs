// SPDX-License-Identifier: MPL-2.0

//! Monitor program: Connect to an intercom and print every state change.
//!
//! Unlocks the door once after connecting, then watches the event stream
//! until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example monitor -- <host> [username] [password]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=intercom_lib=debug cargo run --example monitor -- 192.168.1.50 admin 2n
//! ```

use std::env;
use std::time::Duration;

use intercom_lib::{Intercom, IntercomEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 4 {
        eprintln!("Usage: {} <host> [username] [password]", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example monitor -- 192.168.1.50 admin 2n");
        std::process::exit(1);
    }

    let host = &args[1];
    let username = args.get(2).map_or("admin", String::as_str);
    let password = args.get(3).map_or("2n", String::as_str);

    println!("Connecting to {host}...");

    let intercom = Intercom::http(host)
        .with_credentials(username, password)
        .with_poll_interval(Duration::from_secs(10))
        .build()
        .await?;

    let status = intercom.status();
    println!("Connected to {}", intercom.name());
    println!("  Model:    {:?}", status.identity().model);
    println!("  Firmware: {:?}", status.identity().firmware_version);
    println!("  Door:     {:?}", status.door());
    for (id, switch) in status.switches() {
        println!("  Switch {id}: {:?} (on: {})", switch.mode, switch.is_on);
    }
    println!("  Stream:   {}", intercom.stream_source());

    println!("\nEntities:");
    for entity in intercom.entities() {
        println!("  {} ({})", entity.name, entity.unique_id);
    }

    println!("\nUnlocking door...");
    intercom.unlock_door().await?;

    let mut events = intercom.subscribe();
    println!("Watching events, press Ctrl-C to stop.\n");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(IntercomEvent::StateChanged { change, .. }) => println!("change: {change:?}"),
                Ok(IntercomEvent::AvailabilityChanged { availability }) => {
                    println!("availability: {availability:?}");
                }
                Ok(IntercomEvent::AuthenticationFailed) => {
                    eprintln!("Credentials rejected, stopping.");
                    break;
                }
                Err(err) => {
                    eprintln!("Event stream closed: {err}");
                    break;
                }
            },
        }
    }

    intercom.shutdown().await;
    println!("Done.");
    Ok(())
}
