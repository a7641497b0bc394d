// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the only way a [`DeviceStatus`](super::DeviceStatus)
//! is mutated. Polls translate a status response into a list of changes;
//! commands produce optimistic changes; timers produce reverting changes.
//!
//! # Examples
//!
//! ```
//! use intercom_lib::state::{DeviceStatus, StateChange};
//! use intercom_lib::types::DoorState;
//!
//! let mut status = DeviceStatus::new();
//!
//! // Apply returns true if the status actually changed
//! assert!(status.apply(&StateChange::Door(DoorState::Unlocked)));
//!
//! // Applying the same change again returns false
//! assert!(!status.apply(&StateChange::Door(DoorState::Unlocked)));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DoorState, SwitchId};

use super::{Availability, DeviceIdentity};

/// Represents a change in cached device status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// Door lock state reported or commanded.
    Door(DoorState),

    /// Switch output state reported by the device.
    Switch {
        /// The switch number.
        id: SwitchId,
        /// Whether the output is active.
        on: bool,
    },

    /// Switch output state set by a command before the device confirms it.
    SwitchCommanded {
        /// The switch number.
        id: SwitchId,
        /// Whether the output is active.
        on: bool,
        /// When the command completed.
        at: DateTime<Utc>,
    },

    /// Identity fields; only the present ones are merged.
    Identity(DeviceIdentity),

    /// Free-form device state string.
    DeviceState(String),

    /// Local hold indicator of a bistable switch.
    HoldIndicator {
        /// The switch number.
        id: SwitchId,
        /// Whether the switch is held.
        held: bool,
    },

    /// Local momentary "release pressed" indicator of a bistable switch.
    ReleaseIndicator {
        /// The switch number.
        id: SwitchId,
        /// Whether the release control is showing as pressed.
        pressed: bool,
    },

    /// Availability changed after a failed poll.
    Availability(Availability),

    /// A poll succeeded at the given time.
    Refreshed(DateTime<Utc>),

    /// Multiple changes applied together.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Creates a batch from a list of changes.
    ///
    /// A single change is returned unwrapped.
    #[must_use]
    pub fn batch(mut changes: Vec<StateChange>) -> Self {
        if changes.len() == 1 {
            changes.remove(0)
        } else {
            Self::Batch(changes)
        }
    }

    /// Returns the switch this change targets, if any.
    #[must_use]
    pub fn switch_id(&self) -> Option<SwitchId> {
        match self {
            Self::Switch { id, .. }
            | Self::SwitchCommanded { id, .. }
            | Self::HoldIndicator { id, .. }
            | Self::ReleaseIndicator { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Returns `true` if this change only touches local indicators.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        match self {
            Self::HoldIndicator { .. } | Self::ReleaseIndicator { .. } => true,
            Self::Batch(changes) => changes.iter().all(Self::is_local_only),
            _ => false,
        }
    }
}
