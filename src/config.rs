// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intercom configuration.
//!
//! [`IntercomConfig`] is the serializable form of every setting a host
//! needs to set up one intercom. All fields except `host` have defaults,
//! so the smallest valid JSON document is `{"host": "192.168.1.50"}`.
//!
//! Durations are expressed in (fractional) seconds.
//!
//! # Examples
//!
//! ```
//! use intercom_lib::config::IntercomConfig;
//! use intercom_lib::types::{SwitchId, SwitchMode};
//! use std::time::Duration;
//!
//! let config = IntercomConfig::from_json(r#"{
//!     "host": "192.168.1.50",
//!     "password": "secret",
//!     "poll_interval": 15,
//!     "switches": {"2": "pulse"}
//! }"#).unwrap();
//!
//! assert_eq!(config.username, "admin");
//! assert_eq!(config.poll_interval, Duration::from_secs(15));
//! assert_eq!(config.switch_mode(SwitchId::new(2).unwrap()), SwitchMode::Pulse);
//! assert_eq!(config.switch_mode(SwitchId::one()), SwitchMode::Toggle);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, ParseError};
use crate::protocol::HttpConfig;
use crate::types::{SwitchId, SwitchMode};

/// Factory default API user.
pub const DEFAULT_USERNAME: &str = "admin";

/// Factory default API password.
pub const DEFAULT_PASSWORD: &str = "2n";

/// Default status poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default time a pulse switch is assumed on after activation.
pub const DEFAULT_PULSE_WINDOW: Duration = Duration::from_secs(1);

/// Default time the release indicator stays on.
pub const DEFAULT_RELEASE_WINDOW: Duration = Duration::from_secs(1);

/// Settings for one intercom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntercomConfig {
    /// Hostname or IP address.
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use HTTPS instead of plain HTTP.
    #[serde(default)]
    pub use_https: bool,

    /// API user.
    #[serde(default = "default_username")]
    pub username: String,

    /// API password.
    #[serde(default = "default_password")]
    pub password: String,

    /// Display name; derived from the host when unset.
    #[serde(default)]
    pub name: Option<String>,

    /// Status poll interval.
    #[serde(default = "default_poll_interval", with = "secs")]
    pub poll_interval: Duration,

    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "secs")]
    pub timeout: Duration,

    /// How long a pulse switch is assumed on after activation.
    #[serde(default = "default_pulse_window", with = "secs")]
    pub pulse_window: Duration,

    /// How long the release indicator stays on after a release.
    #[serde(default = "default_release_window", with = "secs")]
    pub release_window: Duration,

    /// Explicit mode per switch.
    #[serde(default)]
    pub switches: BTreeMap<SwitchId, SwitchMode>,

    /// Mode of switches neither configured nor described by the device.
    #[serde(default)]
    pub default_switch_mode: SwitchMode,
}

fn default_port() -> u16 {
    HttpConfig::DEFAULT_PORT
}

/// Replaces blank credentials with the factory defaults.
///
/// Each field falls back on its own, so a blank password alone still
/// authenticates with `2n`.
pub(crate) fn resolve_credentials<'a>(username: &'a str, password: &'a str) -> (&'a str, &'a str) {
    let username = if username.trim().is_empty() {
        DEFAULT_USERNAME
    } else {
        username
    };
    let password = if password.is_empty() {
        DEFAULT_PASSWORD
    } else {
        password
    };
    (username, password)
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_timeout() -> Duration {
    HttpConfig::DEFAULT_TIMEOUT
}

fn default_pulse_window() -> Duration {
    DEFAULT_PULSE_WINDOW
}

fn default_release_window() -> Duration {
    DEFAULT_RELEASE_WINDOW
}

impl IntercomConfig {
    /// Creates a configuration with default settings for the given host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            use_https: false,
            username: default_username(),
            password: default_password(),
            name: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: HttpConfig::DEFAULT_TIMEOUT,
            pulse_window: DEFAULT_PULSE_WINDOW,
            release_window: DEFAULT_RELEASE_WINDOW,
            switches: BTreeMap::new(),
            default_switch_mode: SwitchMode::default(),
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the document is malformed or a field
    /// has an invalid value.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(ParseError::Json)
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the API credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pulse window.
    #[must_use]
    pub fn with_pulse_window(mut self, window: Duration) -> Self {
        self.pulse_window = window;
        self
    }

    /// Sets the release indicator window.
    #[must_use]
    pub fn with_release_window(mut self, window: Duration) -> Self {
        self.release_window = window;
        self
    }

    /// Configures the mode of one switch.
    #[must_use]
    pub fn with_switch(mut self, id: SwitchId, mode: SwitchMode) -> Self {
        self.switches.insert(id, mode);
        self
    }

    /// Sets the mode used for switches without an explicit mode.
    #[must_use]
    pub fn with_default_switch_mode(mut self, mode: SwitchMode) -> Self {
        self.default_switch_mode = mode;
        self
    }

    /// Returns the display name, falling back to one derived from the host.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("2N IP Intercom ({})", self.host),
        }
    }

    /// Returns the configured mode of a switch, or the default mode.
    #[must_use]
    pub fn switch_mode(&self, id: SwitchId) -> SwitchMode {
        self.switches
            .get(&id)
            .copied()
            .unwrap_or(self.default_switch_mode)
    }

    /// Returns `true` if the switch has an explicitly configured mode.
    #[must_use]
    pub fn has_switch(&self, id: SwitchId) -> bool {
        self.switches.contains_key(&id)
    }

    /// Checks the settings that cannot be expressed through types.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidConfiguration` if the host is empty or
    /// the poll interval is zero.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.host.trim().is_empty() {
            return Err(DeviceError::InvalidConfiguration(
                "host is required".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(DeviceError::InvalidConfiguration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the credentials used on the wire.
    ///
    /// Blank fields fall back to `admin` / `2n`.
    #[must_use]
    pub fn credentials(&self) -> (&str, &str) {
        resolve_credentials(&self.username, &self.password)
    }

    /// Returns the transport settings of this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let (username, password) = self.credentials();
        let mut config = HttpConfig::new(self.host.clone())
            .with_port(self.port)
            .with_timeout(self.timeout)
            .with_credentials(username, password);
        if self.use_https {
            config = config.with_https();
        }
        config
    }
}

/// Serde adapter for durations written as seconds.
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IntercomConfig::new("10.0.0.5");
        assert_eq!(config.port, 80);
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "2n");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.pulse_window, Duration::from_secs(1));
        assert_eq!(config.release_window, Duration::from_secs(1));
        assert_eq!(config.default_switch_mode, SwitchMode::Toggle);
        assert_eq!(config.display_name(), "2N IP Intercom (10.0.0.5)");
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let config = IntercomConfig::from_json(r#"{"host": "10.0.0.5"}"#).unwrap();
        assert_eq!(config, IntercomConfig::new("10.0.0.5"));
    }

    #[test]
    fn json_with_fractional_windows() {
        let config = IntercomConfig::from_json(
            r#"{"host": "gate", "pulse_window": 0.5, "default_switch_mode": "pulse"}"#,
        )
        .unwrap();
        assert_eq!(config.pulse_window, Duration::from_millis(500));
        assert_eq!(config.default_switch_mode, SwitchMode::Pulse);
    }

    #[test]
    fn json_switch_modes_accept_vendor_names() {
        let config = IntercomConfig::from_json(
            r#"{"host": "gate", "switches": {"1": "monostable", "3": "bistable"}}"#,
        )
        .unwrap();
        assert_eq!(config.switch_mode(SwitchId::one()), SwitchMode::Pulse);
        assert_eq!(
            config.switch_mode(SwitchId::new(3).unwrap()),
            SwitchMode::Toggle
        );
    }

    #[test]
    fn json_rejects_out_of_range_switch() {
        let result = IntercomConfig::from_json(r#"{"host": "gate", "switches": {"0": "pulse"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn json_requires_host() {
        assert!(IntercomConfig::from_json(r#"{"port": 80}"#).is_err());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let result = IntercomConfig::from_json(r#"{"host": "gate", "poll_interval": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_name_wins() {
        let config = IntercomConfig::new("gate").with_name("Front door");
        assert_eq!(config.display_name(), "Front door");
    }

    #[test]
    fn validate_rejects_empty_host() {
        assert!(matches!(
            IntercomConfig::new("").validate(),
            Err(DeviceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = IntercomConfig::new("gate").with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn http_config_carries_credentials() {
        let config = IntercomConfig::new("gate")
            .with_port(8080)
            .with_credentials("user", "pass");
        let http = config.http_config();
        assert_eq!(http.base_url(), "http://gate:8080");
        assert_eq!(http.credentials(), Some(("user", "pass")));
    }

    #[test]
    fn blank_credentials_use_factory_defaults() {
        let config = IntercomConfig::new("gate").with_credentials("", "");
        assert_eq!(config.credentials(), ("admin", "2n"));
        assert_eq!(config.http_config().credentials(), Some(("admin", "2n")));
    }

    #[test]
    fn blank_password_alone_falls_back() {
        let config = IntercomConfig::new("gate").with_credentials("api", "");
        assert_eq!(config.http_config().credentials(), Some(("api", "2n")));
    }

    #[test]
    fn blank_json_credentials_use_factory_defaults() {
        let config =
            IntercomConfig::from_json(r#"{"host": "gate", "username": "", "password": ""}"#).unwrap();
        assert_eq!(config.http_config().credentials(), Some(("admin", "2n")));
    }
}
