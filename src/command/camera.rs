// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera snapshot request.

use crate::command::{Command, endpoint};

/// Request for a still image from the intercom camera.
///
/// The device answers with raw image bytes rather than JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCommand;

impl Command for SnapshotCommand {
    fn path(&self) -> &'static str {
        endpoint::CAMERA_SNAPSHOT
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
