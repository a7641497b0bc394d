// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the intercom library.
//!
//! Failures are grouped by origin: value validation, HTTP transport,
//! response parsing, and device operations. The transport variants map
//! one-to-one onto the failure classes the poller and the command
//! dispatcher react to:
//!
//! | Variant | Class |
//! |---------|-------|
//! | [`ProtocolError::AuthenticationFailed`] | fatal, needs new credentials |
//! | [`ProtocolError::HttpStatus`] | transient |
//! | [`ProtocolError::ConnectionFailed`] | transient |
//! | [`ProtocolError::Timeout`] | transient |
//! | [`ParseError`] | transient |

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during HTTP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// No intercom is registered under the requested entry.
    #[error("intercom entry not found")]
    EntryNotFound,
}

impl Error {
    /// Returns `true` if the device rejected the configured credentials.
    ///
    /// Authentication failures are never retried automatically.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::AuthenticationFailed))
    }

    /// Returns `true` for failures that a later poll may recover from.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Protocol(err) => !matches!(
                err,
                ProtocolError::AuthenticationFailed | ProtocolError::InvalidAddress(_)
            ),
            Self::Parse(_) => true,
            Self::Value(_) | Self::Device(_) | Self::EntryNotFound => false,
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A switch number is outside the range the device exposes.
    #[error("switch id {0} is out of range [1, {max}]", max = crate::types::SwitchId::MAX)]
    InvalidSwitchId(u8),

    /// An unrecognized switch mode string was provided.
    #[error("invalid switch mode: {0}")]
    InvalidSwitchMode(String),

    /// An unrecognized door state string was provided.
    #[error("invalid door state: {0}")]
    InvalidDoorState(String),

    /// An unrecognized on/off string was provided.
    #[error("invalid switch state: {0}")]
    InvalidSwitchState(String),
}

/// Errors related to HTTP communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP client failure not covered by a more specific variant.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device could not be reached (connection refused, DNS failure).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with a non-success status other than 401.
    #[error("HTTP {status} - {reason}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device rejected the credentials (HTTP 401).
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The switch is neither configured nor reported by the device.
    #[error("unknown switch {0}")]
    UnknownSwitch(u8),

    /// The operation requires a different switch mode.
    #[error("switch {switch} is in {mode} mode and does not support {operation}")]
    UnsupportedMode {
        /// The switch number.
        switch: u8,
        /// The configured mode of the switch.
        mode: crate::types::SwitchMode,
        /// The rejected operation.
        operation: &'static str,
    },

    /// The device answered a command with `"success": false`.
    #[error("command rejected by device: {0}")]
    CommandRejected(String),

    /// Background polling is not running (stopped, shut down or disabled).
    #[error("background polling is not running")]
    PollingStopped,

    /// The session was shut down; no further commands are sent.
    #[error("intercom session is shut down")]
    SessionClosed,

    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwitchMode;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidSwitchId(0);
        assert_eq!(err.to_string(), "switch id 0 is out of range [1, 16]");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::InvalidSwitchMode("latch".to_string()).into();
        assert!(matches!(err, Error::Value(ValueError::InvalidSwitchMode(_))));
    }

    #[test]
    fn http_status_display() {
        let err = ProtocolError::HttpStatus {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 - Internal Server Error");
    }

    #[test]
    fn auth_failure_is_not_transient() {
        let err: Error = ProtocolError::AuthenticationFailed.into();
        assert!(err.is_auth_failure());
        assert!(!err.is_transient());
    }

    #[test]
    fn network_failures_are_transient() {
        let timeout: Error = ProtocolError::Timeout(10_000).into();
        let refused: Error = ProtocolError::ConnectionFailed("refused".to_string()).into();
        let status: Error = ProtocolError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
        }
        .into();

        assert!(timeout.is_transient());
        assert!(refused.is_transient());
        assert!(status.is_transient());
        assert!(!status.is_auth_failure());
    }

    #[test]
    fn parse_failure_is_transient() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = ParseError::from(json_err).into();
        assert!(err.is_transient());
    }

    #[test]
    fn unsupported_mode_display() {
        let err = DeviceError::UnsupportedMode {
            switch: 2,
            mode: SwitchMode::Pulse,
            operation: "hold",
        };
        assert_eq!(
            err.to_string(),
            "switch 2 is in pulse mode and does not support hold"
        );
    }
}
