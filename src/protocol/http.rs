// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for 2N intercoms.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::command::Command;
use crate::error::ProtocolError;
use crate::protocol::{CommandResponse, Transport};

// ============================================================================
// HttpConfig - Connection parameters for one intercom
// ============================================================================

/// Connection parameters for an intercom.
///
/// Immutable once converted into an [`HttpClient`].
///
/// # Examples
///
/// ```
/// use intercom_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.100");
///
/// // With all options
/// let config = HttpConfig::new("192.168.1.100")
///     .with_port(8080)
///     .with_credentials("admin", "2n")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.100:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Idle keep-alive connections retained per device.
    const MAX_IDLE_CONNECTIONS: usize = 2;
    /// How long an idle keep-alive connection is retained.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a new configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the intercom
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    /// Intercoms ship with self-signed certificates, so certificate
    /// validation is disabled for HTTPS connections.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets HTTP basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// The client owns a single connection pool that is reused by every
    /// request to this device and released when the client is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .pool_max_idle_per_host(Self::MAX_IDLE_CONNECTIONS)
            .pool_idle_timeout(Self::IDLE_TIMEOUT)
            .danger_accept_invalid_certs(self.use_https)
            .build()
            .map_err(ProtocolError::Http)?;

        let credentials = self
            .credentials
            .map(|(username, password)| Credentials { username, password });

        Ok(HttpClient {
            base_url,
            host: self.host,
            client,
            credentials,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpClient - Pooled HTTP client bound to one intercom
// ============================================================================

/// HTTP client for communicating with an intercom.
///
/// Cloning is cheap and shares the underlying connection pool.
///
/// # Examples
///
/// ```no_run
/// use intercom_lib::command::SystemInfoCommand;
/// use intercom_lib::protocol::{HttpConfig, Transport};
///
/// # async fn example() -> intercom_lib::Result<()> {
/// let client = HttpConfig::new("192.168.1.100")
///     .with_credentials("admin", "2n")
///     .into_client()?;
/// let response = client.send_command(&SystemInfoCommand).await?;
/// let body = response.json()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    host: String,
    client: Client,
    credentials: Option<Credentials>,
    timeout: Duration,
}

/// HTTP authentication credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl HttpClient {
    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the device host without scheme or port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the configured credentials, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Builds the full URL for a command.
    fn build_url<C: Command + ?Sized>(&self, command: &C) -> String {
        format!("{}{}", self.base_url, command.to_path_and_query())
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }

    async fn execute(&self, url: &str) -> Result<Response, ProtocolError> {
        tracing::debug!(url = %url, "Sending HTTP request");

        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if status != StatusCode::OK {
            return Err(ProtocolError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            ProtocolError::Timeout(millis)
        } else if err.is_connect() {
            ProtocolError::ConnectionFailed(err.to_string())
        } else {
            ProtocolError::Http(err)
        }
    }
}

impl Transport for HttpClient {
    async fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> Result<CommandResponse, ProtocolError> {
        let url = self.build_url(command);
        let response = self.execute(&url).await?;

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        tracing::debug!(body = %body, "Received HTTP response");

        Ok(CommandResponse::new(body))
    }

    async fn fetch_bytes<C: Command + Sync>(&self, command: &C) -> Result<Vec<u8>, ProtocolError> {
        let url = self.build_url(command);
        let response = self.execute(&url).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?;

        tracing::debug!(len = bytes.len(), "Received binary HTTP response");

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{SwitchCommand, SystemInfoCommand};
    use crate::types::{SwitchAction, SwitchId};

    #[test]
    fn build_url_without_query() {
        let client = HttpConfig::new("192.168.1.100").into_client().unwrap();
        let url = client.build_url(&SystemInfoCommand);
        assert_eq!(url, "http://192.168.1.100/api/system/info");
    }

    #[test]
    fn build_url_with_query() {
        let client = HttpConfig::new("192.168.1.100")
            .with_port(8080)
            .into_client()
            .unwrap();
        let cmd = SwitchCommand::pulse(SwitchId::new(2).unwrap(), SwitchAction::On);
        assert_eq!(
            client.build_url(&cmd),
            "http://192.168.1.100:8080/api/switch/ctrl?switch=2&action=on"
        );
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = HttpConfig::new("  ").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    // =========================================================================
    // HttpConfig tests
    // =========================================================================

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.host(), "192.168.1.100");
        assert_eq!(config.port(), 80);
        assert!(!config.use_https());
        assert!(config.credentials().is_none());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_config_with_https() {
        let config = HttpConfig::new("192.168.1.100").with_https();
        assert!(config.use_https());
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://192.168.1.100");
    }

    #[test]
    fn http_config_with_https_custom_port() {
        let config = HttpConfig::new("192.168.1.100")
            .with_port(8443)
            .with_https();
        assert_eq!(config.base_url(), "https://192.168.1.100:8443");
    }

    #[test]
    fn http_config_with_credentials() {
        let config = HttpConfig::new("192.168.1.100").with_credentials("admin", "2n");
        assert_eq!(config.credentials(), Some(("admin", "2n")));
    }

    #[test]
    fn http_config_base_url_custom_port() {
        let config = HttpConfig::new("192.168.1.100").with_port(8080);
        assert_eq!(config.base_url(), "http://192.168.1.100:8080");
    }

    #[test]
    fn http_config_into_client() {
        let config = HttpConfig::new("intercom.local").with_credentials("user", "pass");
        let client = config.into_client().unwrap();
        assert_eq!(client.base_url(), "http://intercom.local");
        assert_eq!(client.host(), "intercom.local");
        assert_eq!(client.credentials().unwrap().username, "user");
    }
}
