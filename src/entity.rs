// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity descriptors and device info.
//!
//! These are plain values a host adapter maps onto its own entity model.
//! Unique ids are derived from the host so they stay stable across
//! restarts.

use serde::{Deserialize, Serialize};

use crate::state::DeviceIdentity;
use crate::types::{SwitchId, SwitchMode};

/// Manufacturer reported in [`DeviceInfo`].
pub const MANUFACTURER: &str = "2N";

/// Model reported until the device tells its own.
pub const DEFAULT_MODEL: &str = "IP Intercom";

/// What an entity controls or shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EntityKind {
    /// Door lock; on means unlocked.
    Door,
    /// A switch output.
    Switch {
        /// The switch number.
        id: SwitchId,
        /// The switch mode.
        mode: SwitchMode,
    },
    /// Hold control of a toggle switch.
    HoldSwitch {
        /// The switch number.
        id: SwitchId,
    },
    /// Momentary release control of a toggle switch.
    ReleaseSwitch {
        /// The switch number.
        id: SwitchId,
    },
    /// Camera stream and snapshot.
    Camera {
        /// Camera number.
        index: u8,
    },
    /// Free-form device state.
    DeviceStateSensor,
}

/// An entity a host would register for the intercom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Stable unique id.
    pub unique_id: String,
    /// Display name.
    pub name: String,
    /// What the entity represents.
    pub kind: EntityKind,
}

/// Device registry information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable identifier; the device host.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Always `"2N"`.
    pub manufacturer: String,
    /// Reported model, or a generic one.
    pub model: String,
    /// Reported firmware version.
    pub sw_version: Option<String>,
    /// Reported hardware revision.
    pub hw_version: Option<String>,
    /// Reported serial number.
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Builds device info from the identity discovered so far.
    #[must_use]
    pub fn new(host: &str, name: &str, identity: &DeviceIdentity) -> Self {
        Self {
            identifier: host.to_string(),
            name: name.to_string(),
            manufacturer: MANUFACTURER.to_string(),
            model: identity
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            sw_version: identity.firmware_version.clone(),
            hw_version: identity.hardware_version.clone(),
            serial_number: identity.serial_number.clone(),
        }
    }
}

/// A registered switch, as needed to describe its entities.
#[derive(Debug, Clone, Copy)]
pub struct SwitchEntry<'a> {
    /// The switch number.
    pub id: SwitchId,
    /// The switch mode.
    pub mode: SwitchMode,
    /// Display name.
    pub name: &'a str,
}

/// Lists the entities of an intercom.
///
/// Order: door, then each switch followed by its hold and release
/// controls if it is a toggle switch, then camera and device state sensor.
#[must_use]
pub fn describe(host: &str, device_name: &str, switches: &[SwitchEntry<'_>]) -> Vec<EntityDescriptor> {
    let mut entities = vec![EntityDescriptor {
        unique_id: format!("{host}_door"),
        name: format!("{device_name} Door"),
        kind: EntityKind::Door,
    }];

    for switch in switches {
        let id = switch.id;
        entities.push(EntityDescriptor {
            unique_id: format!("{host}_switch_{id}"),
            name: switch.name.to_string(),
            kind: EntityKind::Switch {
                id,
                mode: switch.mode,
            },
        });

        if switch.mode.is_bistable() {
            entities.push(EntityDescriptor {
                unique_id: format!("{host}_hold_switch_{id}"),
                name: format!("{} Hold", switch.name),
                kind: EntityKind::HoldSwitch { id },
            });
            entities.push(EntityDescriptor {
                unique_id: format!("{host}_release_switch_{id}"),
                name: format!("{} Release", switch.name),
                kind: EntityKind::ReleaseSwitch { id },
            });
        }
    }

    entities.push(EntityDescriptor {
        unique_id: format!("{host}_camera_1"),
        name: format!("{device_name} Camera 1"),
        kind: EntityKind::Camera { index: 1 },
    });
    entities.push(EntityDescriptor {
        unique_id: format!("{host}_device_state"),
        name: format!("{device_name} Device State"),
        kind: EntityKind::DeviceStateSensor,
    });

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_for_mixed_switches() {
        let switches = [
            SwitchEntry {
                id: SwitchId::one(),
                mode: SwitchMode::Pulse,
                name: "Lobby Switch 1",
            },
            SwitchEntry {
                id: SwitchId::new(2).unwrap(),
                mode: SwitchMode::Toggle,
                name: "Gate",
            },
        ];
        let entities = describe("10.0.0.5", "Lobby", &switches);

        let ids: Vec<&str> = entities.iter().map(|e| e.unique_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "10.0.0.5_door",
                "10.0.0.5_switch_1",
                "10.0.0.5_switch_2",
                "10.0.0.5_hold_switch_2",
                "10.0.0.5_release_switch_2",
                "10.0.0.5_camera_1",
                "10.0.0.5_device_state",
            ]
        );
        assert_eq!(entities[3].name, "Gate Hold");
        assert_eq!(entities[0].name, "Lobby Door");
    }

    #[test]
    fn device_info_defaults_model() {
        let info = DeviceInfo::new("10.0.0.5", "Lobby", &DeviceIdentity::default());
        assert_eq!(info.manufacturer, "2N");
        assert_eq!(info.model, "IP Intercom");
        assert!(info.sw_version.is_none());
    }

    #[test]
    fn device_info_uses_identity() {
        let identity = DeviceIdentity {
            model: Some("2N IP Verso".to_string()),
            firmware_version: Some("2.38".to_string()),
            ..DeviceIdentity::default()
        };
        let info = DeviceInfo::new("10.0.0.5", "Lobby", &identity);
        assert_eq!(info.model, "2N IP Verso");
        assert_eq!(info.sw_version.as_deref(), Some("2.38"));
        assert_eq!(info.identifier, "10.0.0.5");
    }
}
