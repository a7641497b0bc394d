// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `intercom_lib` - A Rust library to poll and control 2N IP intercoms.
//!
//! The library talks to the intercom's HTTP API, keeps a cached view of the
//! device in sync through periodic polling, and exposes the door, switch and
//! camera controls as async methods.
//!
//! # Supported Features
//!
//! - **Door control**: lock and unlock through `/api/door/ctrl`
//! - **Switches**: pulse (monostable) and toggle (bistable) outputs, with
//!   hold and release controls and local auto-revert
//! - **Status polling**: periodic `/api/system/info` polling with
//!   on-demand refreshes after every command
//! - **Camera**: RTSP stream source and JPEG snapshots
//! - **Events**: `watch` snapshots and broadcast change events
//! - **Multi-device**: an [`IntercomManager`] owning several sessions
//!
//! # Quick Start
//!
//! ```no_run
//! use intercom_lib::Intercom;
//! use intercom_lib::types::SwitchId;
//!
//! #[tokio::main]
//! async fn main() -> intercom_lib::Result<()> {
//!     // Performs the initial poll; fails on bad credentials
//!     let intercom = Intercom::http("192.168.1.50")
//!         .with_credentials("admin", "2n")
//!         .build()
//!         .await?;
//!
//!     intercom.unlock_door().await?;
//!     intercom.set_switch(SwitchId::one(), true).await?;
//!
//!     println!("door: {:?}", intercom.status().door());
//!
//!     intercom.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Watching State Changes
//!
//! ```no_run
//! use intercom_lib::Intercom;
//! use intercom_lib::event::IntercomEvent;
//!
//! # async fn example() -> intercom_lib::Result<()> {
//! let intercom = Intercom::http("192.168.1.50").build().await?;
//! let mut events = intercom.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         IntercomEvent::StateChanged { change, .. } => println!("{change:?}"),
//!         IntercomEvent::AvailabilityChanged { availability } => {
//!             println!("availability: {availability:?}");
//!         }
//!         IntercomEvent::AuthenticationFailed => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod command;
pub mod config;
mod device;
pub mod entity;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use config::IntercomConfig;
pub use device::{Intercom, IntercomBuilder};
pub use entity::{DeviceInfo, EntityDescriptor, EntityKind};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{EventBus, IntercomEvent};
pub use manager::{EntryId, IntercomManager};
pub use protocol::{HttpClient, HttpConfig, Transport};
pub use state::{Availability, DeviceStatus, StateChange};
pub use types::{DoorState, SwitchId, SwitchMode};
