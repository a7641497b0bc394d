// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System status query.

use crate::command::{Command, endpoint};

/// Query for device status and identity.
///
/// The response is parsed into a
/// [`SystemInfoResponse`](crate::response::SystemInfoResponse).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemInfoCommand;

impl Command for SystemInfoCommand {
    fn path(&self) -> &'static str {
        endpoint::SYSTEM_INFO
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
