// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport layer for communicating with intercoms.
//!
//! The device exposes a plain HTTP API: every request is an authenticated
//! `GET` returning either JSON or, for the camera, raw image bytes.
//!
//! - [`HttpConfig`]: immutable connection parameters
//! - [`HttpClient`]: pooled client bound to one device
//! - [`Transport`]: the seam the device session is generic over
//!
//! Transports never retry; retry policy belongs to the caller.

mod http;

pub use http::{Credentials, HttpClient, HttpConfig};

use std::future::Future;

use crate::command::Command;
use crate::error::{ParseError, ProtocolError};

/// Response body of a JSON endpoint.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    /// The raw response body.
    body: String,
}

impl CommandResponse {
    /// Creates a new command response with the given body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, ParseError> {
        self.parse()
    }

    /// Parses the response as a specific type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}

/// Issues requests against one intercom.
///
/// Futures are `Send` so the poller can drive them from a spawned task.
pub trait Transport: Send + Sync + 'static {
    /// Sends a command and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or the status is not 200.
    fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> impl Future<Output = Result<CommandResponse, ProtocolError>> + Send;

    /// Sends a command and returns the raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or the status is not 200.
    fn fetch_bytes<C: Command + Sync>(
        &self,
        command: &C,
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_json() {
        let response = CommandResponse::new(r#"{"doorState":"locked"}"#);
        let value = response.json().unwrap();
        assert_eq!(value["doorState"], "locked");
    }

    #[test]
    fn response_invalid_json() {
        let response = CommandResponse::new("<html>busy</html>");
        assert!(matches!(response.json(), Err(ParseError::Json(_))));
    }
}
