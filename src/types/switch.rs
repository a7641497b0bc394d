// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch-related types.
//!
//! 2N intercoms number their relay outputs ("switches") from 1. Each switch
//! is driven either as a pulse (monostable) output that the device resets on
//! its own, or as a toggle (bistable) output that stays in the commanded
//! state until the opposite command arrives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Number of a switch output on the device.
///
/// # Examples
///
/// ```
/// use intercom_lib::types::SwitchId;
///
/// let id = SwitchId::new(2).unwrap();
/// assert_eq!(id.value(), 2);
/// assert_eq!(id.to_string(), "2");
///
/// assert!(SwitchId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SwitchId(u8);

impl SwitchId {
    /// Highest switch number accepted.
    pub const MAX: u8 = 16;

    /// Creates a new switch id.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidSwitchId` if `id` is 0 or above [`Self::MAX`].
    pub fn new(id: u8) -> Result<Self, ValueError> {
        if id == 0 || id > Self::MAX {
            return Err(ValueError::InvalidSwitchId(id));
        }
        Ok(Self(id))
    }

    /// Switch 1, present on every device.
    #[must_use]
    pub const fn one() -> Self {
        Self(1)
    }

    /// Returns the numeric value of the id.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Key under which the device reports this switch in `/api/system/info`.
    #[must_use]
    pub fn status_key(&self) -> String {
        format!("switch{}State", self.0)
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SwitchId {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SwitchId> for u8 {
    fn from(id: SwitchId) -> Self {
        id.0
    }
}

/// How a switch output behaves after it is activated.
///
/// # Examples
///
/// ```
/// use intercom_lib::types::SwitchMode;
///
/// assert_eq!("pulse".parse::<SwitchMode>().unwrap(), SwitchMode::Pulse);
/// assert_eq!("bistable".parse::<SwitchMode>().unwrap(), SwitchMode::Toggle);
/// assert_eq!(SwitchMode::default(), SwitchMode::Toggle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchMode {
    /// Momentary output; the device resets it by itself.
    #[serde(alias = "monostable")]
    Pulse,
    /// Latched output; stays in the commanded state.
    #[default]
    #[serde(alias = "bistable")]
    Toggle,
}

impl SwitchMode {
    /// Returns the configuration string for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
            Self::Toggle => "toggle",
        }
    }

    /// Returns `true` for latched switches that get hold/release controls.
    #[must_use]
    pub const fn is_bistable(&self) -> bool {
        matches!(self, Self::Toggle)
    }
}

impl fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pulse" | "monostable" => Ok(Self::Pulse),
            "toggle" | "bistable" => Ok(Self::Toggle),
            _ => Err(ValueError::InvalidSwitchMode(s.to_string())),
        }
    }
}

/// The `action` query parameter accepted by the control endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchAction {
    /// Activate (or hold) the output.
    On,
    /// Deactivate (or release) the output.
    Off,
}

impl SwitchAction {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Returns `true` for [`SwitchAction::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "1" | "true" | "active" => Ok(Self::On),
            "off" | "0" | "false" | "inactive" => Ok(Self::Off),
            _ => Err(ValueError::InvalidSwitchState(s.to_string())),
        }
    }
}

impl From<bool> for SwitchAction {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_id_valid_range() {
        for i in 1..=SwitchId::MAX {
            assert_eq!(SwitchId::new(i).unwrap().value(), i);
        }
    }

    #[test]
    fn switch_id_rejects_zero_and_overflow() {
        assert_eq!(SwitchId::new(0), Err(ValueError::InvalidSwitchId(0)));
        assert_eq!(SwitchId::new(17), Err(ValueError::InvalidSwitchId(17)));
    }

    #[test]
    fn switch_id_status_key() {
        assert_eq!(SwitchId::one().status_key(), "switch1State");
        assert_eq!(SwitchId::new(4).unwrap().status_key(), "switch4State");
    }

    #[test]
    fn switch_id_deserializes_from_number() {
        let id: SwitchId = serde_json::from_str("3").unwrap();
        assert_eq!(id.value(), 3);
        assert!(serde_json::from_str::<SwitchId>("0").is_err());
    }

    #[test]
    fn switch_mode_from_str() {
        assert_eq!("PULSE".parse::<SwitchMode>().unwrap(), SwitchMode::Pulse);
        assert_eq!("monostable".parse::<SwitchMode>().unwrap(), SwitchMode::Pulse);
        assert_eq!("toggle".parse::<SwitchMode>().unwrap(), SwitchMode::Toggle);
        assert!(matches!(
            "latch".parse::<SwitchMode>(),
            Err(ValueError::InvalidSwitchMode(_))
        ));
    }

    #[test]
    fn switch_mode_deserializes_vendor_names() {
        let mode: SwitchMode = serde_json::from_str("\"bistable\"").unwrap();
        assert_eq!(mode, SwitchMode::Toggle);
        let mode: SwitchMode = serde_json::from_str("\"pulse\"").unwrap();
        assert_eq!(mode, SwitchMode::Pulse);
    }

    #[test]
    fn switch_action_from_str() {
        assert_eq!("on".parse::<SwitchAction>().unwrap(), SwitchAction::On);
        assert_eq!("OFF".parse::<SwitchAction>().unwrap(), SwitchAction::Off);
        assert_eq!("1".parse::<SwitchAction>().unwrap(), SwitchAction::On);
        assert!("maybe".parse::<SwitchAction>().is_err());
    }

    #[test]
    fn switch_action_from_bool() {
        assert_eq!(SwitchAction::from(true).as_str(), "on");
        assert_eq!(SwitchAction::from(false).as_str(), "off");
    }
}
