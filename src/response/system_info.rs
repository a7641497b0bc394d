// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `/api/system/info` response parsing.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::protocol::CommandResponse;
use crate::state::{DeviceIdentity, StateChange};
use crate::types::{DoorState, SwitchAction, SwitchId, SwitchMode};

/// Parsed body of a status poll.
///
/// Every field is optional: firmware versions differ in what they report,
/// and a field that is absent must leave the cached value untouched.
///
/// The device either answers with a flat object or wraps the payload in a
/// `{"success": true, "result": {...}}` envelope; both are accepted.
///
/// # Examples
///
/// ```
/// use intercom_lib::response::SystemInfoResponse;
/// use intercom_lib::types::{DoorState, SwitchId};
///
/// let json = serde_json::json!({
///     "success": true,
///     "result": {
///         "variant": "2N IP Verso",
///         "swVersion": "2.38.0.52.4",
///         "doorState": "unlocked",
///         "switch1State": "on"
///     }
/// });
/// let info = SystemInfoResponse::from_json(json).unwrap();
/// assert_eq!(info.model.as_deref(), Some("2N IP Verso"));
/// assert_eq!(info.door_state(), Some(DoorState::Unlocked));
/// assert_eq!(info.switch_states(), vec![(SwitchId::one(), true)]);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoResponse {
    /// Door lock state (`"locked"` / `"unlocked"`).
    #[serde(default)]
    pub door_state: Option<String>,

    /// Free-form device state reported by the firmware.
    #[serde(default)]
    pub device_state: Option<String>,

    /// Product model or variant.
    #[serde(default, alias = "variant")]
    pub model: Option<String>,

    /// Firmware version.
    #[serde(default, alias = "swVersion")]
    pub firmware_version: Option<String>,

    /// Serial number.
    #[serde(default)]
    pub serial_number: Option<String>,

    /// MAC address.
    #[serde(default, alias = "macAddr")]
    pub mac_address: Option<String>,

    /// Hardware revision.
    #[serde(default, alias = "hwVersion")]
    pub hardware_version: Option<String>,

    /// Name configured on the device.
    #[serde(default)]
    pub device_name: Option<String>,

    /// Additional switch outputs, numbered from 2 unless they carry an id.
    #[serde(default)]
    pub ports: Vec<PortInfo>,

    /// Remaining fields, scanned for `switch<N>State` keys.
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

/// A switch output advertised in the `ports` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortInfo {
    /// Explicit switch number, when the firmware provides one.
    #[serde(default, alias = "switch")]
    pub id: Option<u8>,

    /// Display name configured on the device.
    #[serde(default)]
    pub name: Option<String>,

    /// `"monostable"` or `"bistable"`.
    #[serde(default)]
    pub mode: Option<String>,

    /// Current output state.
    #[serde(default)]
    pub state: Option<Value>,
}

/// A switch advertised by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSwitch {
    /// The switch number.
    pub id: SwitchId,
    /// Name reported by the device.
    pub name: Option<String>,
    /// Mode reported by the device, if recognizable.
    pub mode: Option<SwitchMode>,
}

/// First switch number assigned to entries of the `ports` list.
const FIRST_PORT_SWITCH: u8 = 2;

impl SystemInfoResponse {
    /// Parses a response body, unwrapping the vendor envelope if present.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not a JSON object, if the device
    /// reports `"success": false`, or if a known field has the wrong type.
    pub fn from_json(value: Value) -> Result<Self, ParseError> {
        let Value::Object(mut object) = value else {
            return Err(ParseError::UnexpectedFormat(
                "status body is not a JSON object".to_string(),
            ));
        };

        if object.get("success") == Some(&Value::Bool(false)) {
            let description = object
                .get("error")
                .and_then(|e| e.get("description"))
                .and_then(Value::as_str)
                .unwrap_or("device reported failure")
                .to_string();
            return Err(ParseError::UnexpectedFormat(description));
        }

        let payload = match object.remove("result") {
            Some(result @ Value::Object(_)) => result,
            Some(other) => {
                object.insert("result".to_string(), other);
                Value::Object(object)
            }
            None => Value::Object(object),
        };

        serde_json::from_value(payload).map_err(ParseError::Json)
    }

    /// Parses a transport response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not valid JSON or has an
    /// unexpected shape.
    pub fn from_response(response: &CommandResponse) -> Result<Self, ParseError> {
        Self::from_json(response.json()?)
    }

    /// Returns the parsed door state, ignoring unrecognized values.
    #[must_use]
    pub fn door_state(&self) -> Option<DoorState> {
        self.door_state.as_deref().and_then(|s| s.parse().ok())
    }

    /// Returns the identity fields present in this response.
    #[must_use]
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            model: self.model.clone(),
            firmware_version: self.firmware_version.clone(),
            serial_number: self.serial_number.clone(),
            mac_address: self.mac_address.clone(),
            hardware_version: self.hardware_version.clone(),
            device_name: self.device_name.clone(),
        }
    }

    /// Returns every switch state the device reported, ordered by id.
    ///
    /// `switch<N>State` keys take precedence over a port's `state`.
    #[must_use]
    pub fn switch_states(&self) -> Vec<(SwitchId, bool)> {
        let mut states: HashMap<SwitchId, bool> = self
            .ports_with_ids()
            .filter_map(|(id, port)| port.state.as_ref().and_then(parse_on_off).map(|on| (id, on)))
            .collect();

        for (key, value) in &self.extra {
            if let Some(id) = parse_switch_key(key)
                && let Some(on) = parse_on_off(value)
            {
                states.insert(id, on);
            }
        }

        let mut states: Vec<(SwitchId, bool)> = states.into_iter().collect();
        states.sort_by_key(|(id, _)| *id);
        states
    }

    /// Returns the switches advertised in the `ports` list.
    #[must_use]
    pub fn discovered_switches(&self) -> Vec<DiscoveredSwitch> {
        self.ports_with_ids()
            .map(|(id, port)| DiscoveredSwitch {
                id,
                name: port.name.clone(),
                mode: port.mode.as_deref().and_then(|m| m.parse().ok()),
            })
            .collect()
    }

    /// Converts this response into state changes.
    ///
    /// Only fields present in the response produce a change.
    #[must_use]
    pub fn to_state_changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if let Some(door) = self.door_state() {
            changes.push(StateChange::Door(door));
        }

        for (id, on) in self.switch_states() {
            changes.push(StateChange::Switch { id, on });
        }

        let identity = self.identity();
        if !identity.is_empty() {
            changes.push(StateChange::Identity(identity));
        }

        if let Some(state) = &self.device_state {
            changes.push(StateChange::DeviceState(state.clone()));
        }

        changes
    }

    fn ports_with_ids(&self) -> impl Iterator<Item = (SwitchId, &PortInfo)> {
        self.ports.iter().enumerate().filter_map(|(index, port)| {
            let id = match port.id {
                Some(id) => id,
                None => u8::try_from(index).ok()?.checked_add(FIRST_PORT_SWITCH)?,
            };
            SwitchId::new(id).ok().map(|id| (id, port))
        })
    }
}

/// Parses `switch<N>State` keys.
fn parse_switch_key(key: &str) -> Option<SwitchId> {
    let number = key.strip_prefix("switch")?.strip_suffix("State")?;
    SwitchId::new(number.parse().ok()?).ok()
}

/// Accepts `"on"`/`"off"`, booleans and `0`/`1`.
fn parse_on_off(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        Value::String(s) => s.parse::<SwitchAction>().ok().map(|a| a.is_on()),
        _ => None,
    }
}
