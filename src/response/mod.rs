// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for intercom JSON responses.

mod system_info;

pub use system_info::{DiscoveredSwitch, PortInfo, SystemInfoResponse};
