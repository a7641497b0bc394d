// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for intercom control.
//!
//! Each type validates its input at construction time so that commands built
//! from them are always accepted by the device's HTTP API.
//!
//! # Types
//!
//! - [`SwitchId`] - Switch output number (1-16)
//! - [`SwitchMode`] - Pulse (monostable) or toggle (bistable) behavior
//! - [`SwitchAction`] - The `on`/`off` action sent on the wire
//! - [`DoorState`] - Locked/unlocked

mod door;
mod switch;

pub use door::DoorState;
pub use switch::{SwitchAction, SwitchId, SwitchMode};
