// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for intercom status changes.
//!
//! Every intercom owns an [`EventBus`] backed by a tokio broadcast channel.
//! Subscribers receive every [`IntercomEvent`] published after they
//! subscribe; slow subscribers lag rather than block the session.
//!
//! # Examples
//!
//! ```
//! use intercom_lib::event::{EventBus, IntercomEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(IntercomEvent::AuthenticationFailed);
//! ```

mod event_bus;
mod intercom_event;

pub use event_bus::EventBus;
pub use intercom_event::IntercomEvent;
