// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport for tests that need paused time.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::command::{Command, endpoint};
use crate::error::ProtocolError;
use crate::protocol::{CommandResponse, Transport};

/// Scripted transport: answers by path and records every request.
///
/// Paths without a scripted answer return `{"success": true}`.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    bodies: Mutex<HashMap<&'static str, String>>,
    failures: Mutex<HashMap<&'static str, ProtocolError>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond_status(&self, body: serde_json::Value) {
        self.failures.lock().remove(endpoint::SYSTEM_INFO);
        self.respond_path(endpoint::SYSTEM_INFO, &body.to_string());
    }

    pub(crate) fn respond_path(&self, path: &'static str, body: &str) {
        self.bodies.lock().insert(path, body.to_string());
    }

    pub(crate) fn fail_path(&self, path: &'static str, error: ProtocolError) {
        self.failures.lock().insert(path, error);
    }

    /// Every request so far, as path and query.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn answer<C: Command>(&self, command: &C) -> Result<String, ProtocolError> {
        self.calls.lock().push(command.to_path_and_query());

        if let Some(error) = self.failures.lock().get(command.path()) {
            return Err(duplicate(error));
        }
        Ok(self
            .bodies
            .lock()
            .get(command.path())
            .cloned()
            .unwrap_or_else(|| r#"{"success": true}"#.to_string()))
    }
}

fn duplicate(error: &ProtocolError) -> ProtocolError {
    match error {
        ProtocolError::Timeout(ms) => ProtocolError::Timeout(*ms),
        ProtocolError::HttpStatus { status, reason } => ProtocolError::HttpStatus {
            status: *status,
            reason: reason.clone(),
        },
        ProtocolError::InvalidAddress(msg) => ProtocolError::InvalidAddress(msg.clone()),
        ProtocolError::AuthenticationFailed => ProtocolError::AuthenticationFailed,
        other => ProtocolError::ConnectionFailed(other.to_string()),
    }
}

impl Transport for MockTransport {
    async fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> Result<CommandResponse, ProtocolError> {
        self.answer(command).map(CommandResponse::new)
    }

    async fn fetch_bytes<C: Command + Sync>(&self, command: &C) -> Result<Vec<u8>, ProtocolError> {
        self.answer(command).map(String::into_bytes)
    }
}
