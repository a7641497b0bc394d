// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device status cache.
//!
//! [`DeviceStatus`] holds the last known door, switch and identity values
//! of an intercom. It is only ever mutated by applying a [`StateChange`],
//! which keeps merge semantics in one place: absent values never clear
//! known ones.
//!
//! # Examples
//!
//! ```
//! use intercom_lib::state::{DeviceStatus, StateChange};
//! use intercom_lib::types::DoorState;
//!
//! let mut status = DeviceStatus::new();
//! status.apply(&StateChange::Door(DoorState::Locked));
//!
//! assert_eq!(status.door(), Some(DoorState::Locked));
//! ```

mod device_state;
mod state_change;

pub use device_state::{
    Availability, DeviceIdentity, DeviceStatus, HoldIndicators, SwitchState,
};
pub use state_change::StateChange;
