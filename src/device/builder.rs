// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intercom session builder.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::command::SystemInfoCommand;
use crate::config::IntercomConfig;
use crate::device::{Intercom, Profile, Shared};
use crate::error::Error;
use crate::protocol::{HttpClient, Transport};
use crate::response::SystemInfoResponse;
use crate::state::{DeviceStatus, StateChange};
use crate::types::{SwitchId, SwitchMode};

use super::poller::Poller;

/// Builder for [`Intercom`] sessions.
///
/// Created with [`Intercom::http`] or [`Intercom::from_config`].
///
/// # Examples
///
/// ```no_run
/// use intercom_lib::Intercom;
/// use intercom_lib::types::{SwitchId, SwitchMode};
/// use std::time::Duration;
///
/// # async fn example() -> intercom_lib::Result<()> {
/// let intercom = Intercom::http("192.168.1.50")
///     .with_credentials("api", "secret")
///     .with_poll_interval(Duration::from_secs(10))
///     .with_switch(SwitchId::one(), SwitchMode::Pulse)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IntercomBuilder {
    config: IntercomConfig,
    polling: bool,
}

impl IntercomBuilder {
    /// Creates a builder from a configuration.
    #[must_use]
    pub fn new(config: IntercomConfig) -> Self {
        Self {
            config,
            polling: true,
        }
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &IntercomConfig {
        &self.config
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the API credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(username, password);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    /// Sets the background poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(interval);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets how long a pulse switch shows as on.
    #[must_use]
    pub fn with_pulse_window(mut self, window: Duration) -> Self {
        self.config = self.config.with_pulse_window(window);
        self
    }

    /// Sets how long the release indicator shows as pressed.
    #[must_use]
    pub fn with_release_window(mut self, window: Duration) -> Self {
        self.config = self.config.with_release_window(window);
        self
    }

    /// Configures the mode of one switch.
    #[must_use]
    pub fn with_switch(mut self, id: SwitchId, mode: SwitchMode) -> Self {
        self.config = self.config.with_switch(id, mode);
        self
    }

    /// Sets the mode of switches without an explicit mode.
    #[must_use]
    pub fn with_default_switch_mode(mut self, mode: SwitchMode) -> Self {
        self.config = self.config.with_default_switch_mode(mode);
        self
    }

    /// Disables the background poller.
    ///
    /// The cache then only changes through commands and explicit
    /// [`Intercom::refresh`] calls.
    #[must_use]
    pub fn without_polling(mut self) -> Self {
        self.polling = false;
        self
    }

    /// Connects over HTTP and performs the initial poll.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the initial poll
    /// fails. A 401 answer yields an error for which
    /// [`Error::is_auth_failure`] is `true`.
    pub async fn build(self) -> Result<Intercom<HttpClient>, Error> {
        self.config.validate()?;
        let client = self.config.http_config().into_client()?;
        self.build_with_transport(client).await
    }

    /// Builds a session over a custom transport.
    ///
    /// Performs the initial poll, registers every switch, and starts the
    /// background poller unless disabled.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the initial poll
    /// fails.
    pub async fn build_with_transport<T: Transport>(self, transport: T) -> Result<Intercom<T>, Error> {
        self.config.validate()?;
        let host = self.config.host.clone();

        let info = match initial_poll(&transport).await {
            Ok(info) => info,
            Err(err) => {
                if err.is_auth_failure() {
                    tracing::error!(host = %host, "Intercom rejected credentials during setup");
                } else {
                    tracing::error!(host = %host, error = %err, "Intercom setup failed");
                }
                return Err(err);
            }
        };

        let name = self.config.display_name();
        let switches = resolve_switches(&self.config, &name, &info);

        let mut status = DeviceStatus::new();
        for (id, (mode, _)) in &switches {
            status.register_switch(*id, *mode);
        }
        let mut changes = info.to_state_changes();
        changes.push(StateChange::Refreshed(Utc::now()));
        status.apply(&StateChange::Batch(changes));

        let (username, password) = self.config.credentials();
        let profile = Profile {
            host: host.clone(),
            name,
            base_url: self.config.http_config().base_url(),
            username: username.to_string(),
            password: password.to_string(),
            pulse_window: self.config.pulse_window,
            release_window: self.config.release_window,
            switch_names: switches
                .into_iter()
                .map(|(id, (_, name))| (id, name))
                .collect(),
        };

        tracing::info!(
            host = %host,
            switches = profile.switch_names.len(),
            polling = self.polling,
            "Intercom set up"
        );

        let shared = Arc::new(Shared::new(transport, profile, status));
        let poller = self
            .polling
            .then(|| Poller::spawn(Arc::clone(&shared), self.config.poll_interval));

        Ok(Intercom::new(shared, poller))
    }
}

async fn initial_poll<T: Transport>(transport: &T) -> Result<SystemInfoResponse, Error> {
    let response = transport.send_command(&SystemInfoCommand).await?;
    Ok(SystemInfoResponse::from_response(&response)?)
}

/// Decides the mode and name of every switch.
///
/// Switch 1 always exists. Explicit configuration wins over the mode the
/// device reports for a port, which wins over the default mode.
fn resolve_switches(
    config: &IntercomConfig,
    device_name: &str,
    info: &SystemInfoResponse,
) -> BTreeMap<SwitchId, (SwitchMode, String)> {
    let mut switches = BTreeMap::new();

    switches.insert(
        SwitchId::one(),
        (
            config.switch_mode(SwitchId::one()),
            format!("{device_name} Switch 1"),
        ),
    );

    for port in info.discovered_switches() {
        let mode = if config.has_switch(port.id) {
            config.switch_mode(port.id)
        } else {
            port.mode.unwrap_or(config.default_switch_mode)
        };
        let name = port.name.unwrap_or_else(|| format!("Switch {}", port.id));
        switches.entry(port.id).or_insert((mode, name));
    }

    let reported = info.switch_states().into_iter().map(|(id, _)| id);
    for id in config.switches.keys().copied().chain(reported) {
        switches
            .entry(id)
            .or_insert_with(|| (config.switch_mode(id), format!("Switch {id}")));
    }

    switches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockTransport;
    use crate::error::ProtocolError;
    use serde_json::json;

    fn info(value: serde_json::Value) -> SystemInfoResponse {
        SystemInfoResponse::from_json(value).unwrap()
    }

    #[test]
    fn switch_one_always_exists() {
        let config = IntercomConfig::new("gate");
        let switches = resolve_switches(&config, "Gate", &info(json!({})));

        assert_eq!(switches.len(), 1);
        let (mode, name) = &switches[&SwitchId::one()];
        assert_eq!(*mode, SwitchMode::Toggle);
        assert_eq!(name, "Gate Switch 1");
    }

    #[test]
    fn ports_bring_their_mode_and_name() {
        let config = IntercomConfig::new("gate");
        let switches = resolve_switches(
            &config,
            "Gate",
            &info(json!({"ports": [
                {"name": "Garage", "mode": "monostable"},
                {"mode": "bistable"}
            ]})),
        );

        let two = SwitchId::new(2).unwrap();
        let three = SwitchId::new(3).unwrap();
        assert_eq!(switches[&two], (SwitchMode::Pulse, "Garage".to_string()));
        assert_eq!(switches[&three], (SwitchMode::Toggle, "Switch 3".to_string()));
    }

    #[test]
    fn configured_mode_wins_over_port_mode() {
        let two = SwitchId::new(2).unwrap();
        let config = IntercomConfig::new("gate").with_switch(two, SwitchMode::Toggle);
        let switches = resolve_switches(
            &config,
            "Gate",
            &info(json!({"ports": [{"name": "Garage", "mode": "monostable"}]})),
        );

        assert_eq!(switches[&two].0, SwitchMode::Toggle);
    }

    #[test]
    fn configured_and_reported_switches_are_registered() {
        let config = IntercomConfig::new("gate")
            .with_switch(SwitchId::new(4).unwrap(), SwitchMode::Pulse)
            .with_default_switch_mode(SwitchMode::Pulse);
        let switches = resolve_switches(&config, "Gate", &info(json!({"switch3State": "off"})));

        let ids: Vec<u8> = switches.keys().map(SwitchId::value).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(switches[&SwitchId::new(3).unwrap()].0, SwitchMode::Pulse);
    }

    #[tokio::test]
    async fn setup_registers_switches_and_merges_first_poll() {
        let transport = MockTransport::new();
        transport.respond_status(json!({
            "success": true,
            "result": {
                "variant": "2N IP Verso",
                "doorState": "unlocked",
                "switch1State": "on",
                "ports": [{"name": "Gate", "mode": "bistable"}]
            }
        }));

        let intercom = IntercomBuilder::new(IntercomConfig::new("10.0.0.5"))
            .without_polling()
            .build_with_transport(transport)
            .await
            .unwrap();

        let status = intercom.status();
        assert!(status.is_available());
        assert!(status.is_door_unlocked());
        assert_eq!(status.is_switch_on(SwitchId::one()), Some(true));
        assert_eq!(status.identity().model.as_deref(), Some("2N IP Verso"));
        assert!(status.hold_indicators(SwitchId::new(2).unwrap()).is_some());
        assert_eq!(intercom.switch_ids().len(), 2);
        assert_eq!(intercom.name(), "2N IP Intercom (10.0.0.5)");
    }

    #[tokio::test]
    async fn setup_fails_on_auth_error() {
        let transport = MockTransport::new();
        transport.fail_path("/api/system/info", ProtocolError::AuthenticationFailed);

        let result = IntercomBuilder::new(IntercomConfig::new("10.0.0.5"))
            .build_with_transport(transport)
            .await;

        assert!(result.unwrap_err().is_auth_failure());
    }

    #[tokio::test]
    async fn setup_fails_on_garbage_body() {
        let transport = MockTransport::new();
        transport.respond_path("/api/system/info", "<html>login</html>");

        let result = IntercomBuilder::new(IntercomConfig::new("10.0.0.5"))
            .build_with_transport(transport)
            .await;

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn setup_rejects_invalid_config() {
        let result = IntercomBuilder::new(IntercomConfig::new(""))
            .build_with_transport(MockTransport::new())
            .await;

        assert!(matches!(result, Err(Error::Device(_))));
    }

    #[test]
    fn builder_methods_update_config() {
        let builder = IntercomBuilder::new(IntercomConfig::new("gate"))
            .with_port(8080)
            .with_credentials("api", "secret")
            .with_name("Gate")
            .with_pulse_window(Duration::from_millis(300));

        let config = builder.config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.username, "api");
        assert_eq!(config.display_name(), "Gate");
        assert_eq!(config.pulse_window, Duration::from_millis(300));
    }
}
