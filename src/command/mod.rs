// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intercom HTTP API requests.
//!
//! Every request the library issues is a `GET` against a fixed vendor
//! endpoint with a handful of query parameters. This module provides typed
//! representations of those requests.
//!
//! # Available Commands
//!
//! | Command Type | Endpoint | Purpose |
//! |-------------|----------|---------|
//! | [`SystemInfoCommand`] | `/api/system/info` | Status and identity poll |
//! | [`SwitchCommand::Pulse`] | `/api/switch/ctrl` | Instant (pulse) switch control |
//! | [`SwitchCommand::Hold`] | `/api/switch/hold` | Bistable hold/release |
//! | [`DoorCommand`] | `/api/door/ctrl` | Door lock/unlock |
//! | [`SnapshotCommand`] | `/api/camera/snapshot` | Still image |
//!
//! # Examples
//!
//! ```
//! use intercom_lib::command::{Command, SwitchCommand};
//! use intercom_lib::types::{SwitchAction, SwitchId};
//!
//! let cmd = SwitchCommand::hold(SwitchId::new(2).unwrap(), SwitchAction::On);
//! assert_eq!(cmd.path(), "/api/switch/hold");
//! assert_eq!(cmd.to_path_and_query(), "/api/switch/hold?switch=2&action=on");
//! ```

mod camera;
mod control;
mod system;

pub use camera::SnapshotCommand;
pub use control::{DoorCommand, SwitchCommand};
pub use system::SystemInfoCommand;

/// Vendor API endpoint paths.
pub mod endpoint {
    /// Status and identity poll.
    pub const SYSTEM_INFO: &str = "/api/system/info";
    /// Pulse/instant switch control.
    pub const SWITCH_CONTROL: &str = "/api/switch/ctrl";
    /// Bistable hold/release.
    pub const SWITCH_HOLD: &str = "/api/switch/hold";
    /// Door lock/unlock.
    pub const DOOR_CONTROL: &str = "/api/door/ctrl";
    /// Camera still image.
    pub const CAMERA_SNAPSHOT: &str = "/api/camera/snapshot";
}

/// A request that can be sent to the intercom.
pub trait Command {
    /// Returns the endpoint path, e.g. `"/api/switch/ctrl"`.
    fn path(&self) -> &'static str;

    /// Returns the query parameters in the order they are sent.
    fn query(&self) -> Vec<(&'static str, String)>;

    /// Returns the path with the percent-encoded query string appended.
    fn to_path_and_query(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            return self.path().to_string();
        }

        let encoded: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();
        format!("{}?{}", self.path(), encoded.join("&"))
    }
}
