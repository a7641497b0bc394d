// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch and door control commands.

use crate::command::{Command, endpoint};
use crate::types::{DoorState, SwitchAction, SwitchId};

/// Command to drive a switch output.
///
/// # Examples
///
/// ```
/// use intercom_lib::command::{Command, SwitchCommand};
/// use intercom_lib::types::{SwitchAction, SwitchId};
///
/// // Fire a pulse on switch 1
/// let cmd = SwitchCommand::pulse(SwitchId::one(), SwitchAction::On);
/// assert_eq!(cmd.path(), "/api/switch/ctrl");
///
/// // Release a held bistable switch
/// let cmd = SwitchCommand::hold(SwitchId::one(), SwitchAction::Off);
/// assert_eq!(cmd.path(), "/api/switch/hold");
/// assert_eq!(cmd.query()[1], ("action", "off".to_string()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Instant control through `/api/switch/ctrl`.
    Pulse {
        /// The switch to drive.
        switch: SwitchId,
        /// The requested action.
        action: SwitchAction,
    },
    /// Hold (`on`) or release (`off`) through `/api/switch/hold`.
    Hold {
        /// The switch to drive.
        switch: SwitchId,
        /// The requested action.
        action: SwitchAction,
    },
}

impl SwitchCommand {
    /// Creates an instant control command.
    #[must_use]
    pub const fn pulse(switch: SwitchId, action: SwitchAction) -> Self {
        Self::Pulse { switch, action }
    }

    /// Creates a hold/release command.
    #[must_use]
    pub const fn hold(switch: SwitchId, action: SwitchAction) -> Self {
        Self::Hold { switch, action }
    }

    /// Returns the targeted switch.
    #[must_use]
    pub const fn switch(&self) -> SwitchId {
        match self {
            Self::Pulse { switch, .. } | Self::Hold { switch, .. } => *switch,
        }
    }

    /// Returns the requested action.
    #[must_use]
    pub const fn action(&self) -> SwitchAction {
        match self {
            Self::Pulse { action, .. } | Self::Hold { action, .. } => *action,
        }
    }
}

impl Command for SwitchCommand {
    fn path(&self) -> &'static str {
        match self {
            Self::Pulse { .. } => endpoint::SWITCH_CONTROL,
            Self::Hold { .. } => endpoint::SWITCH_HOLD,
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("switch", self.switch().to_string()),
            ("action", self.action().as_str().to_string()),
        ]
    }
}

/// Command to lock or unlock the door.
///
/// The door strike is wired to switch 1 unless configured otherwise.
///
/// # Examples
///
/// ```
/// use intercom_lib::command::{Command, DoorCommand};
/// use intercom_lib::types::DoorState;
///
/// let cmd = DoorCommand::set(DoorState::Unlocked);
/// assert_eq!(cmd.to_path_and_query(), "/api/door/ctrl?switch=1&action=on");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorCommand {
    switch: SwitchId,
    state: DoorState,
}

impl DoorCommand {
    /// Creates a door command for the default door switch.
    #[must_use]
    pub const fn set(state: DoorState) -> Self {
        Self {
            switch: SwitchId::one(),
            state,
        }
    }

    /// Targets a different door switch.
    #[must_use]
    pub const fn with_switch(mut self, switch: SwitchId) -> Self {
        self.switch = switch;
        self
    }

    /// Returns the requested door state.
    #[must_use]
    pub const fn state(&self) -> DoorState {
        self.state
    }
}

impl Command for DoorCommand {
    fn path(&self) -> &'static str {
        endpoint::DOOR_CONTROL
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("switch", self.switch.to_string()),
            ("action", self.state.action().as_str().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_command_query() {
        let cmd = SwitchCommand::pulse(SwitchId::new(2).unwrap(), SwitchAction::On);
        assert_eq!(cmd.path(), "/api/switch/ctrl");
        assert_eq!(
            cmd.query(),
            vec![("switch", "2".to_string()), ("action", "on".to_string())]
        );
    }

    #[test]
    fn hold_command_query() {
        let cmd = SwitchCommand::hold(SwitchId::new(4).unwrap(), SwitchAction::Off);
        assert_eq!(cmd.path(), "/api/switch/hold");
        assert_eq!(cmd.switch().value(), 4);
        assert_eq!(cmd.action(), SwitchAction::Off);
    }

    #[test]
    fn door_command_with_switch() {
        let cmd = DoorCommand::set(DoorState::Unlocked).with_switch(SwitchId::new(3).unwrap());
        assert_eq!(cmd.to_path_and_query(), "/api/door/ctrl?switch=3&action=on");
        assert_eq!(cmd.state(), DoorState::Unlocked);
    }
}
