// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door lock state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

use super::SwitchAction;

/// Lock state of the door controlled by the intercom.
///
/// # Examples
///
/// ```
/// use intercom_lib::types::{DoorState, SwitchAction};
///
/// let state: DoorState = "unlocked".parse().unwrap();
/// assert!(state.is_unlocked());
/// assert_eq!(state.action(), SwitchAction::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    /// The door is locked.
    Locked,
    /// The door is unlocked.
    Unlocked,
}

impl DoorState {
    /// Returns the string the device uses in `doorState`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }

    /// Returns `true` if the door is unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    /// Action sent to `/api/door/ctrl` to reach this state.
    #[must_use]
    pub const fn action(&self) -> SwitchAction {
        match self {
            Self::Locked => SwitchAction::Off,
            Self::Unlocked => SwitchAction::On,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "locked" | "closed" => Ok(Self::Locked),
            "unlocked" | "open" | "opened" => Ok(Self::Unlocked),
            _ => Err(ValueError::InvalidDoorState(s.to_string())),
        }
    }
}
