// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intercom event types.

use serde::{Deserialize, Serialize};

use crate::state::{Availability, DeviceStatus, StateChange};

/// Events emitted by an intercom session.
///
/// # Examples
///
/// ```
/// use intercom_lib::event::IntercomEvent;
/// use intercom_lib::state::{Availability, DeviceStatus, StateChange};
/// use intercom_lib::types::DoorState;
///
/// let event = IntercomEvent::state_changed(
///     StateChange::Door(DoorState::Unlocked),
///     DeviceStatus::new(),
/// );
/// assert!(event.is_state_change());
///
/// let event = IntercomEvent::AvailabilityChanged {
///     availability: Availability::Available,
/// };
/// assert!(!event.is_state_change());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntercomEvent {
    /// Cached status changed.
    ///
    /// Emitted for poll results, optimistic command updates and timer
    /// reverts alike.
    StateChanged {
        /// The change that was applied.
        change: StateChange,
        /// The complete status after the change.
        new_state: DeviceStatus,
    },

    /// The device became reachable or unreachable.
    AvailabilityChanged {
        /// The new availability.
        availability: Availability,
    },

    /// The device rejected the configured credentials.
    ///
    /// Background polling has stopped; the host should ask for new
    /// credentials and set the intercom up again.
    AuthenticationFailed,
}

impl IntercomEvent {
    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(change: StateChange, new_state: DeviceStatus) -> Self {
        Self::StateChanged { change, new_state }
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Returns `true` if this event reports an authentication failure.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::AvailabilityChanged {
                    availability: Availability::AuthenticationFailed
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DoorState;

    #[test]
    fn state_change_events() {
        let event = IntercomEvent::state_changed(
            StateChange::Door(DoorState::Locked),
            DeviceStatus::new(),
        );
        assert!(event.is_state_change());
        assert!(!event.is_auth_failure());
    }

    #[test]
    fn auth_failure_events() {
        assert!(IntercomEvent::AuthenticationFailed.is_auth_failure());
        assert!(
            IntercomEvent::AvailabilityChanged {
                availability: Availability::AuthenticationFailed
            }
            .is_auth_failure()
        );
        assert!(
            !IntercomEvent::AvailabilityChanged {
                availability: Availability::Available
            }
            .is_auth_failure()
        );
    }
}
