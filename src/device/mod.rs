// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intercom session.
//!
//! An [`Intercom`] owns everything tied to one device: the transport, the
//! status cache, the background poller, the auto-revert timers and the
//! event bus. It is created through [`IntercomBuilder`], which performs
//! the first status poll and refuses to produce a session if that poll
//! fails.
//!
//! # Switch state model
//!
//! Every switch has a mode fixed at setup:
//!
//! - **Pulse** (monostable): activating it fires `/api/switch/ctrl`; the
//!   switch shows as on for the pulse window and then reverts to off.
//!   Turning it off does nothing.
//! - **Toggle** (bistable): on/off map to `/api/switch/hold` actions and
//!   the cached state follows the command immediately. Toggle switches
//!   also expose hold and release controls with local indicators.
//!
//! A status poll that reports `switch<N>State` always wins over the local
//! assumption.
//!
//! # Examples
//!
//! ```no_run
//! use intercom_lib::Intercom;
//! use intercom_lib::types::{DoorState, SwitchId};
//!
//! # async fn example() -> intercom_lib::Result<()> {
//! let intercom = Intercom::http("192.168.1.50")
//!     .with_credentials("admin", "2n")
//!     .build()
//!     .await?;
//!
//! intercom.set_door(DoorState::Unlocked).await?;
//! intercom.set_switch(SwitchId::one(), true).await?;
//!
//! intercom.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod builder;
mod poller;
mod timers;

#[cfg(test)]
pub(crate) mod mock;

pub use builder::IntercomBuilder;

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::camera;
use crate::command::{Command, DoorCommand, SnapshotCommand, SwitchCommand, SystemInfoCommand};
use crate::entity::{self, DeviceInfo, EntityDescriptor, SwitchEntry};
use crate::error::{DeviceError, Error, ProtocolError};
use crate::event::{EventBus, IntercomEvent};
use crate::protocol::{CommandResponse, HttpClient, Transport};
use crate::response::SystemInfoResponse;
use crate::state::{Availability, DeviceStatus, StateChange};
use crate::types::{DoorState, SwitchAction, SwitchId, SwitchMode};

use poller::Poller;
use timers::{TimerKind, Timers};

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub(crate) host: String,
    pub(crate) name: String,
    pub(crate) base_url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) pulse_window: Duration,
    pub(crate) release_window: Duration,
    /// Display name of every registered switch.
    pub(crate) switch_names: BTreeMap<SwitchId, String>,
}

/// State shared between the session handle, the poller and timer tasks.
#[derive(Debug)]
pub(crate) struct Shared<T: Transport> {
    transport: T,
    profile: Profile,
    status: RwLock<DeviceStatus>,
    status_tx: watch::Sender<DeviceStatus>,
    events: EventBus,
    refresh_requested: Notify,
    /// Cancelled when background polling must stop.
    polling: CancellationToken,
    timers: Timers,
}

impl<T: Transport> Shared<T> {
    fn new(transport: T, profile: Profile, status: DeviceStatus) -> Self {
        let (status_tx, _) = watch::channel(status.clone());
        Self {
            transport,
            profile,
            status: RwLock::new(status),
            status_tx,
            events: EventBus::new(),
            refresh_requested: Notify::new(),
            polling: CancellationToken::new(),
            timers: Timers::new(),
        }
    }

    /// Applies a change and publishes the result if anything changed.
    ///
    /// Publishing happens under the write guard so that watchers and
    /// subscribers observe changes in the order they were applied. A poll
    /// that only moves `last_updated` reaches watchers but emits no event.
    fn apply(&self, change: StateChange) -> bool {
        let mut status = self.status.write();
        let previous = status.availability().clone();
        let previous_update = status.last_updated();
        if !status.apply(&change) {
            if status.last_updated() != previous_update {
                self.status_tx.send_replace(status.clone());
            }
            return false;
        }

        let snapshot = status.clone();
        self.status_tx.send_replace(snapshot.clone());

        let availability = snapshot.availability().clone();
        self.events
            .publish(IntercomEvent::state_changed(change, snapshot));
        if availability != previous {
            self.events
                .publish(IntercomEvent::AvailabilityChanged { availability });
        }
        true
    }

    fn snapshot(&self) -> DeviceStatus {
        self.status.read().clone()
    }

    fn switch_mode(&self, id: SwitchId) -> Result<SwitchMode, Error> {
        self.status
            .read()
            .switch_mode(id)
            .ok_or_else(|| DeviceError::UnknownSwitch(id.value()).into())
    }

    /// Polls `/api/system/info` once and merges the result.
    async fn refresh(&self) -> Result<(), Error> {
        match self.fetch_status().await {
            Ok(info) => {
                let mut changes = info.to_state_changes();
                changes.push(StateChange::Refreshed(Utc::now()));
                self.apply(StateChange::batch(changes));
                Ok(())
            }
            Err(err) if err.is_auth_failure() => {
                tracing::error!(host = %self.profile.host, "Intercom rejected credentials, polling stopped");
                self.polling.cancel();
                self.apply(StateChange::Availability(Availability::AuthenticationFailed));
                self.events.publish(IntercomEvent::AuthenticationFailed);
                Err(err)
            }
            Err(err) => {
                tracing::warn!(host = %self.profile.host, error = %err, "Status poll failed");
                self.apply(StateChange::Availability(Availability::Unavailable {
                    reason: err.to_string(),
                }));
                Err(err)
            }
        }
    }

    async fn fetch_status(&self) -> Result<SystemInfoResponse, Error> {
        let response = self.transport.send_command(&SystemInfoCommand).await?;
        Ok(SystemInfoResponse::from_response(&response)?)
    }

    /// Sends a control command, logging any failure.
    async fn send<C: Command + Sync>(&self, command: &C) -> Result<CommandResponse, Error> {
        if self.timers.is_closed() {
            return Err(DeviceError::SessionClosed.into());
        }

        let result = match self.transport.send_command(command).await {
            Ok(response) => check_accepted(&response).map(|()| response),
            Err(err) => Err(err.into()),
        };

        if let Err(err) = &result {
            tracing::error!(
                host = %self.profile.host,
                path = command.path(),
                error = %err,
                "Intercom command failed"
            );
        }
        result
    }

    fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }
}

/// Rejects command responses carrying `"success": false`.
///
/// Bodies that are not JSON objects are accepted as-is.
fn check_accepted(response: &CommandResponse) -> Result<(), Error> {
    let Ok(serde_json::Value::Object(body)) = response.json() else {
        return Ok(());
    };
    if body.get("success") == Some(&serde_json::Value::Bool(false)) {
        let description = body
            .get("error")
            .and_then(|e| e.get("description"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no description")
            .to_string();
        return Err(DeviceError::CommandRejected(description).into());
    }
    Ok(())
}

/// A session with one intercom.
///
/// # Type Parameter
///
/// `T` is the transport; [`HttpClient`] in production.
///
/// # Lifecycle
///
/// Call [`shutdown`](Self::shutdown) to stop polling and cancel pending
/// timers. Dropping the session without shutting down stops the poller
/// and timers as well, but does not wait for the poll task to finish.
#[derive(Debug)]
pub struct Intercom<T: Transport> {
    shared: Arc<Shared<T>>,
    poller: Mutex<Option<Poller>>,
}

impl Intercom<HttpClient> {
    /// Creates a builder for an intercom reachable over HTTP.
    ///
    /// The builder starts from the factory defaults: port 80, user
    /// `admin`, password `2n`.
    #[must_use]
    pub fn http(host: impl Into<String>) -> IntercomBuilder {
        IntercomBuilder::new(crate::config::IntercomConfig::new(host))
    }

    /// Creates a builder from a complete configuration.
    #[must_use]
    pub fn from_config(config: crate::config::IntercomConfig) -> IntercomBuilder {
        IntercomBuilder::new(config)
    }
}

impl<T: Transport> Intercom<T> {
    fn new(shared: Arc<Shared<T>>, poller: Option<Poller>) -> Self {
        Self {
            shared,
            poller: Mutex::new(poller),
        }
    }

    /// Returns the device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.shared.profile.host
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.profile.name
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.shared.transport
    }

    /// Returns a snapshot of the cached status.
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.shared.snapshot()
    }

    /// Returns a receiver that always holds the latest status.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Subscribes to status and availability events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IntercomEvent> {
        self.shared.events.subscribe()
    }

    /// Returns the ids of all registered switches.
    #[must_use]
    pub fn switch_ids(&self) -> Vec<SwitchId> {
        self.shared.profile.switch_names.keys().copied().collect()
    }

    /// Returns `true` while the background poller is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.lock().is_some() && !self.shared.polling.is_cancelled()
    }

    // ========== Polling ==========

    /// Polls the device once and merges the result into the cache.
    ///
    /// Transient failures mark the intercom unavailable and leave cached
    /// values untouched. An authentication failure also stops background
    /// polling.
    ///
    /// # Errors
    ///
    /// Returns the transport or parse error of the failed poll.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.shared.refresh().await
    }

    /// Asks the background poller for an out-of-cycle refresh.
    ///
    /// Requests made while a poll is in flight result in one more poll
    /// afterwards; further requests coalesce.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::PollingStopped` if background polling is not
    /// running.
    pub fn request_refresh(&self) -> Result<(), Error> {
        if !self.is_polling() {
            return Err(DeviceError::PollingStopped.into());
        }
        self.shared.request_refresh();
        Ok(())
    }

    // ========== Door ==========

    /// Locks or unlocks the door.
    ///
    /// Every call reaches the device, even if the cache already shows the
    /// requested state. A refresh is requested whether or not the command
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails; the cache is left unchanged.
    pub async fn set_door(&self, state: DoorState) -> Result<(), Error> {
        let result = self.shared.send(&DoorCommand::set(state)).await;
        if result.is_ok() {
            self.shared.apply(StateChange::Door(state));
        }
        self.shared.request_refresh();
        result.map(|_| ())
    }

    /// Unlocks the door.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn unlock_door(&self) -> Result<(), Error> {
        self.set_door(DoorState::Unlocked).await
    }

    /// Locks the door.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn lock_door(&self) -> Result<(), Error> {
        self.set_door(DoorState::Locked).await
    }

    // ========== Switches ==========

    /// Turns a switch on or off according to its mode.
    ///
    /// Pulse switches fire a pulse on `on` and ignore `off`; toggle switches
    /// latch to the requested state.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnknownSwitch` for unregistered switches, or
    /// the transport error of a failed command.
    pub async fn set_switch(&self, id: SwitchId, on: bool) -> Result<(), Error> {
        match self.shared.switch_mode(id)? {
            SwitchMode::Pulse if !on => {
                tracing::debug!(switch = %id, "Ignoring off for pulse switch");
                Ok(())
            }
            SwitchMode::Pulse => self.pulse(id).await,
            SwitchMode::Toggle => {
                let command = SwitchCommand::hold(id, SwitchAction::from(on));
                let result = self.shared.send(&command).await;
                if result.is_ok() {
                    self.shared.apply(StateChange::SwitchCommanded {
                        id,
                        on,
                        at: Utc::now(),
                    });
                }
                self.shared.request_refresh();
                result.map(|_| ())
            }
        }
    }

    /// Fires an instant pulse on a switch regardless of its mode.
    ///
    /// Only pulse switches are optimistically marked on; the state of a
    /// toggle switch is left to the next poll.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnknownSwitch` for unregistered switches, or
    /// the transport error of a failed command.
    pub async fn press_switch(&self, id: SwitchId) -> Result<(), Error> {
        match self.shared.switch_mode(id)? {
            SwitchMode::Pulse => self.pulse(id).await,
            SwitchMode::Toggle => {
                let result = self
                    .shared
                    .send(&SwitchCommand::pulse(id, SwitchAction::On))
                    .await;
                self.shared.request_refresh();
                result.map(|_| ())
            }
        }
    }

    /// Holds a toggle switch on.
    ///
    /// Sets the hold indicator and cancels a pending release-indicator
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnsupportedMode` for pulse switches,
    /// `DeviceError::UnknownSwitch` for unregistered switches, or the
    /// transport error of a failed command.
    pub async fn hold_switch(&self, id: SwitchId) -> Result<(), Error> {
        self.require_toggle(id, "hold")?;

        let result = self
            .shared
            .send(&SwitchCommand::hold(id, SwitchAction::On))
            .await;
        if result.is_ok() {
            self.shared.timers.cancel(id, TimerKind::ReleaseReset);
            self.shared.apply(StateChange::Batch(vec![
                StateChange::HoldIndicator { id, held: true },
                StateChange::ReleaseIndicator { id, pressed: false },
                StateChange::SwitchCommanded {
                    id,
                    on: true,
                    at: Utc::now(),
                },
            ]));
        }
        self.shared.request_refresh();
        result.map(|_| ())
    }

    /// Releases a held toggle switch.
    ///
    /// Clears the hold indicator and shows the release indicator for the
    /// release window.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnsupportedMode` for pulse switches,
    /// `DeviceError::UnknownSwitch` for unregistered switches, or the
    /// transport error of a failed command.
    pub async fn release_switch(&self, id: SwitchId) -> Result<(), Error> {
        self.require_toggle(id, "release")?;

        let result = self
            .shared
            .send(&SwitchCommand::hold(id, SwitchAction::Off))
            .await;
        if result.is_ok() && !self.shared.timers.is_closed() {
            self.shared.apply(StateChange::Batch(vec![
                StateChange::HoldIndicator { id, held: false },
                StateChange::ReleaseIndicator { id, pressed: true },
                StateChange::SwitchCommanded {
                    id,
                    on: false,
                    at: Utc::now(),
                },
            ]));
            self.schedule_revert(
                id,
                TimerKind::ReleaseReset,
                self.shared.profile.release_window,
                StateChange::ReleaseIndicator { id, pressed: false },
            );
        }
        self.shared.request_refresh();
        result.map(|_| ())
    }

    async fn pulse(&self, id: SwitchId) -> Result<(), Error> {
        let result = self
            .shared
            .send(&SwitchCommand::pulse(id, SwitchAction::On))
            .await;
        // A shutdown during the request leaves nothing to revert the switch
        if result.is_ok() && !self.shared.timers.is_closed() {
            self.shared.apply(StateChange::SwitchCommanded {
                id,
                on: true,
                at: Utc::now(),
            });
            self.schedule_revert(
                id,
                TimerKind::PulseOff,
                self.shared.profile.pulse_window,
                StateChange::Switch { id, on: false },
            );
        }
        self.shared.request_refresh();
        result.map(|_| ())
    }

    fn require_toggle(&self, id: SwitchId, operation: &'static str) -> Result<(), Error> {
        match self.shared.switch_mode(id)? {
            SwitchMode::Toggle => Ok(()),
            mode => Err(DeviceError::UnsupportedMode {
                switch: id.value(),
                mode,
                operation,
            }
            .into()),
        }
    }

    /// Applies `change` once `delay` elapses, unless superseded.
    fn schedule_revert(&self, id: SwitchId, kind: TimerKind, delay: Duration, change: StateChange) {
        let shared: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        self.shared.timers.schedule(id, kind, delay, move || {
            if let Some(shared) = shared.upgrade() {
                shared.apply(change);
            }
        });
    }

    // ========== Camera ==========

    /// Fetches a still image from the camera.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn snapshot(&self) -> Result<Vec<u8>, Error> {
        match self.shared.transport.fetch_bytes(&SnapshotCommand).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                if matches!(err, ProtocolError::AuthenticationFailed) {
                    tracing::error!(host = %self.host(), "Camera snapshot rejected, check credentials");
                } else {
                    tracing::error!(host = %self.host(), error = %err, "Camera snapshot failed");
                }
                Err(err.into())
            }
        }
    }

    /// Returns the RTSP URL of the camera stream, credentials included.
    #[must_use]
    pub fn stream_source(&self) -> String {
        let profile = &self.shared.profile;
        camera::stream_source(&profile.host, &profile.username, &profile.password)
    }

    /// Returns a snapshot URL with embedded credentials.
    #[must_use]
    pub fn snapshot_url(&self) -> String {
        let profile = &self.shared.profile;
        camera::snapshot_url(&profile.base_url, &profile.username, &profile.password)
    }

    // ========== Entities ==========

    /// Returns device registry information.
    #[must_use]
    pub fn device_info(&self) -> DeviceInfo {
        let status = self.shared.status.read();
        DeviceInfo::new(self.host(), self.name(), status.identity())
    }

    /// Lists the entities a host would register for this intercom.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityDescriptor> {
        let status = self.shared.status.read();
        let switches: Vec<SwitchEntry<'_>> = self
            .shared
            .profile
            .switch_names
            .iter()
            .filter_map(|(id, name)| {
                status.switch_mode(*id).map(|mode| SwitchEntry {
                    id: *id,
                    mode,
                    name,
                })
            })
            .collect();
        entity::describe(self.host(), self.name(), &switches)
    }

    // ========== Lifecycle ==========

    /// Stops polling, cancels pending timers and releases the transport.
    ///
    /// Consuming the session makes a second shutdown impossible.
    pub async fn shutdown(self) {
        self.close().await;
    }

    /// Shutdown for sessions shared behind an `Arc`.
    pub(crate) async fn close(&self) {
        tracing::info!(host = %self.shared.profile.host, "Shutting down intercom");
        self.shared.polling.cancel();
        let poller = self.poller.lock().take();
        if let Some(poller) = poller {
            poller.stop().await;
        }
        self.shared.timers.cancel_all();
    }
}
