// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device status.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DoorState, SwitchId, SwitchMode};

use super::StateChange;

/// Last known status of an intercom.
///
/// Fields are merged, never cleared: a poll that omits a field leaves the
/// previously known value in place, so transient failures or partial
/// responses do not blank out state.
///
/// Switches are registered when the device session is set up; changes
/// targeting an unregistered switch are ignored.
///
/// # Examples
///
/// ```
/// use intercom_lib::state::{DeviceStatus, StateChange};
/// use intercom_lib::types::{SwitchId, SwitchMode};
///
/// let mut status = DeviceStatus::new();
/// status.register_switch(SwitchId::one(), SwitchMode::Toggle);
/// status.apply(&StateChange::Switch { id: SwitchId::one(), on: true });
/// assert_eq!(status.is_switch_on(SwitchId::one()), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    door: Option<DoorState>,
    switches: BTreeMap<SwitchId, SwitchState>,
    identity: DeviceIdentity,
    device_state: Option<String>,
    /// Local-only hold/release indicators of bistable switches.
    indicators: BTreeMap<SwitchId, HoldIndicators>,
    availability: Availability,
    last_updated: Option<DateTime<Utc>>,
}

/// Cached state of one switch output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchState {
    /// Configured or discovered mode, fixed for the session.
    pub mode: SwitchMode,
    /// Whether the output is active.
    pub is_on: bool,
    /// When a command last completed for this switch.
    pub last_commanded_at: Option<DateTime<Utc>>,
}

impl SwitchState {
    /// Creates an inactive switch in the given mode.
    #[must_use]
    pub const fn new(mode: SwitchMode) -> Self {
        Self {
            mode,
            is_on: false,
            last_commanded_at: None,
        }
    }
}

/// Identity fields reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Product model or variant.
    pub model: Option<String>,
    /// Firmware version.
    pub firmware_version: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// MAC address.
    pub mac_address: Option<String>,
    /// Hardware revision.
    pub hardware_version: Option<String>,
    /// Name configured on the device.
    pub device_name: Option<String>,
}

impl DeviceIdentity {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.firmware_version.is_none()
            && self.serial_number.is_none()
            && self.mac_address.is_none()
            && self.hardware_version.is_none()
            && self.device_name.is_none()
    }

    /// Copies every present field of `other` into `self`.
    ///
    /// Returns `true` if any field changed.
    pub fn merge(&mut self, other: &DeviceIdentity) -> bool {
        let mut changed = false;

        macro_rules! merge_field {
            ($field:ident) => {
                if let Some(value) = &other.$field
                    && self.$field.as_ref() != Some(value)
                {
                    self.$field = Some(value.clone());
                    changed = true;
                }
            };
        }

        merge_field!(model);
        merge_field!(firmware_version);
        merge_field!(serial_number);
        merge_field!(mac_address);
        merge_field!(hardware_version);
        merge_field!(device_name);

        changed
    }
}

/// Local indicators layered on a bistable switch's hold/release commands.
///
/// Never reported by the device and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldIndicators {
    /// The switch was held through the hold control.
    pub held: bool,
    /// The release control was pressed recently.
    pub release_pressed: bool,
}

/// Whether the device answered the most recent poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// No poll has completed yet.
    #[default]
    Unknown,
    /// The last poll succeeded.
    Available,
    /// The last poll failed with a transient error.
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
    /// The device rejected the credentials; polling has stopped.
    AuthenticationFailed,
}

impl Availability {
    /// Returns `true` if the last poll succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl DeviceStatus {
    /// Creates an empty status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Door ==========

    /// Returns the door state, if known.
    #[must_use]
    pub fn door(&self) -> Option<DoorState> {
        self.door
    }

    /// Returns `true` if the door is known to be unlocked.
    #[must_use]
    pub fn is_door_unlocked(&self) -> bool {
        self.door.is_some_and(|d| d.is_unlocked())
    }

    // ========== Switches ==========

    /// Registers a switch in the given mode.
    ///
    /// Bistable switches also get hold/release indicators. Registering an
    /// existing switch keeps its current output state and updates the mode.
    pub fn register_switch(&mut self, id: SwitchId, mode: SwitchMode) {
        self.switches
            .entry(id)
            .and_modify(|s| s.mode = mode)
            .or_insert_with(|| SwitchState::new(mode));

        if mode.is_bistable() {
            self.indicators.entry(id).or_default();
        } else {
            self.indicators.remove(&id);
        }
    }

    /// Returns the cached state of a switch.
    #[must_use]
    pub fn switch(&self, id: SwitchId) -> Option<&SwitchState> {
        self.switches.get(&id)
    }

    /// Returns whether a switch is on, or `None` if it is not registered.
    #[must_use]
    pub fn is_switch_on(&self, id: SwitchId) -> Option<bool> {
        self.switches.get(&id).map(|s| s.is_on)
    }

    /// Returns the mode of a switch, or `None` if it is not registered.
    #[must_use]
    pub fn switch_mode(&self, id: SwitchId) -> Option<SwitchMode> {
        self.switches.get(&id).map(|s| s.mode)
    }

    /// Iterates over all registered switches in id order.
    pub fn switches(&self) -> impl Iterator<Item = (SwitchId, &SwitchState)> {
        self.switches.iter().map(|(id, state)| (*id, state))
    }

    /// Returns the hold/release indicators of a bistable switch.
    #[must_use]
    pub fn hold_indicators(&self, id: SwitchId) -> Option<HoldIndicators> {
        self.indicators.get(&id).copied()
    }

    // ========== Identity ==========

    /// Returns the identity fields known so far.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the free-form device state string.
    #[must_use]
    pub fn device_state(&self) -> Option<&str> {
        self.device_state.as_deref()
    }

    // ========== Availability ==========

    /// Returns the availability after the most recent poll.
    #[must_use]
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Returns `true` if the most recent poll succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Returns the time of the last successful poll.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the status actually changed.
    ///
    /// A [`StateChange::Refreshed`] always records its timestamp but only
    /// counts as a change when availability flips.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Door(door) => {
                if self.door == Some(*door) {
                    false
                } else {
                    self.door = Some(*door);
                    true
                }
            }
            StateChange::Switch { id, on } => match self.switches.get_mut(id) {
                Some(switch) if switch.is_on != *on => {
                    switch.is_on = *on;
                    true
                }
                _ => false,
            },
            StateChange::SwitchCommanded { id, on, at } => match self.switches.get_mut(id) {
                Some(switch) => {
                    switch.last_commanded_at = Some(*at);
                    if switch.is_on == *on {
                        false
                    } else {
                        switch.is_on = *on;
                        true
                    }
                }
                None => false,
            },
            StateChange::Identity(identity) => self.identity.merge(identity),
            StateChange::DeviceState(state) => {
                if self.device_state.as_ref() == Some(state) {
                    false
                } else {
                    self.device_state = Some(state.clone());
                    true
                }
            }
            StateChange::HoldIndicator { id, held } => match self.indicators.get_mut(id) {
                Some(indicators) if indicators.held != *held => {
                    indicators.held = *held;
                    true
                }
                _ => false,
            },
            StateChange::ReleaseIndicator { id, pressed } => match self.indicators.get_mut(id) {
                Some(indicators) if indicators.release_pressed != *pressed => {
                    indicators.release_pressed = *pressed;
                    true
                }
                _ => false,
            },
            StateChange::Availability(availability) => {
                if self.availability == *availability {
                    false
                } else {
                    self.availability = availability.clone();
                    true
                }
            }
            StateChange::Refreshed(at) => {
                self.last_updated = Some(*at);
                if self.availability.is_available() {
                    false
                } else {
                    self.availability = Availability::Available;
                    true
                }
            }
            StateChange::Batch(changes) => {
                let mut any_changed = false;
                for c in changes {
                    if self.apply(c) {
                        any_changed = true;
                    }
                }
                any_changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> SwitchId {
        SwitchId::new(n).unwrap()
    }

    #[test]
    fn new_status_is_empty() {
        let status = DeviceStatus::new();
        assert_eq!(status.door(), None);
        assert!(status.identity().is_empty());
        assert_eq!(status.switches().count(), 0);
        assert_eq!(status.availability(), &Availability::Unknown);
        assert!(status.last_updated().is_none());
    }

    #[test]
    fn door_change_is_reported_once() {
        let mut status = DeviceStatus::new();
        assert!(status.apply(&StateChange::Door(DoorState::Unlocked)));
        assert!(!status.apply(&StateChange::Door(DoorState::Unlocked)));
        assert!(status.is_door_unlocked());
    }

    #[test]
    fn unregistered_switch_is_ignored() {
        let mut status = DeviceStatus::new();
        assert!(!status.apply(&StateChange::Switch { id: id(5), on: true }));
        assert_eq!(status.is_switch_on(id(5)), None);
    }

    #[test]
    fn register_switch_creates_indicators_for_bistable_only() {
        let mut status = DeviceStatus::new();
        status.register_switch(id(1), SwitchMode::Toggle);
        status.register_switch(id(2), SwitchMode::Pulse);

        assert_eq!(status.hold_indicators(id(1)), Some(HoldIndicators::default()));
        assert_eq!(status.hold_indicators(id(2)), None);
        assert_eq!(status.switch_mode(id(2)), Some(SwitchMode::Pulse));
    }

    #[test]
    fn reregister_keeps_output_state() {
        let mut status = DeviceStatus::new();
        status.register_switch(id(1), SwitchMode::Toggle);
        status.apply(&StateChange::Switch { id: id(1), on: true });

        status.register_switch(id(1), SwitchMode::Pulse);
        assert_eq!(status.is_switch_on(id(1)), Some(true));
        assert_eq!(status.hold_indicators(id(1)), None);
    }

    #[test]
    fn commanded_change_records_timestamp() {
        let mut status = DeviceStatus::new();
        status.register_switch(id(1), SwitchMode::Toggle);
        let at = Utc::now();

        assert!(status.apply(&StateChange::SwitchCommanded {
            id: id(1),
            on: true,
            at
        }));
        let switch = status.switch(id(1)).unwrap();
        assert!(switch.is_on);
        assert_eq!(switch.last_commanded_at, Some(at));
    }

    #[test]
    fn identity_fields_never_regress() {
        let mut status = DeviceStatus::new();
        let full = DeviceIdentity {
            model: Some("2N IP Verso".to_string()),
            firmware_version: Some("2.38".to_string()),
            serial_number: Some("54-0000-0001".to_string()),
            mac_address: Some("7C-1E-B3-00-00-01".to_string()),
            hardware_version: None,
            device_name: None,
        };
        assert!(status.apply(&StateChange::Identity(full.clone())));

        let partial = DeviceIdentity {
            firmware_version: Some("2.39".to_string()),
            ..DeviceIdentity::default()
        };
        assert!(status.apply(&StateChange::Identity(partial)));
        assert!(!status.apply(&StateChange::Identity(DeviceIdentity::default())));

        let identity = status.identity();
        assert_eq!(identity.model, full.model);
        assert_eq!(identity.serial_number, full.serial_number);
        assert_eq!(identity.mac_address, full.mac_address);
        assert_eq!(identity.firmware_version.as_deref(), Some("2.39"));
    }

    #[test]
    fn indicators_apply_only_to_bistable_switches() {
        let mut status = DeviceStatus::new();
        status.register_switch(id(1), SwitchMode::Toggle);
        status.register_switch(id(2), SwitchMode::Pulse);

        assert!(status.apply(&StateChange::HoldIndicator { id: id(1), held: true }));
        assert!(!status.apply(&StateChange::HoldIndicator { id: id(2), held: true }));
        assert!(status.apply(&StateChange::ReleaseIndicator {
            id: id(1),
            pressed: true
        }));

        let indicators = status.hold_indicators(id(1)).unwrap();
        assert!(indicators.held);
        assert!(indicators.release_pressed);
    }

    #[test]
    fn refreshed_marks_available() {
        let mut status = DeviceStatus::new();
        let at = Utc::now();

        assert!(status.apply(&StateChange::Refreshed(at)));
        assert!(status.is_available());
        assert_eq!(status.last_updated(), Some(at));

        assert!(!status.apply(&StateChange::Refreshed(Utc::now())));
    }

    #[test]
    fn unavailable_keeps_cached_values() {
        let mut status = DeviceStatus::new();
        status.register_switch(id(1), SwitchMode::Toggle);
        status.apply(&StateChange::Batch(vec![
            StateChange::Door(DoorState::Unlocked),
            StateChange::Switch { id: id(1), on: true },
            StateChange::Refreshed(Utc::now()),
        ]));

        assert!(status.apply(&StateChange::Availability(Availability::Unavailable {
            reason: "timeout".to_string()
        })));

        assert!(!status.is_available());
        assert!(status.is_door_unlocked());
        assert_eq!(status.is_switch_on(id(1)), Some(true));
    }

    #[test]
    fn batch_reports_any_change() {
        let mut status = DeviceStatus::new();
        status.apply(&StateChange::Door(DoorState::Locked));

        let batch = StateChange::Batch(vec![
            StateChange::Door(DoorState::Locked),
            StateChange::DeviceState("ringing".to_string()),
        ]);
        assert!(status.apply(&batch));
        assert!(!status.apply(&batch));
        assert_eq!(status.device_state(), Some("ringing"));
    }
}
