// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background status polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::protocol::Transport;

use super::Shared;

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop without waiting for it.
#[derive(Debug)]
pub(super) struct Poller {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Starts polling every `interval`, beginning one interval from now.
    ///
    /// The loop stops when the shared polling token is cancelled, which
    /// also happens when the device rejects the credentials.
    pub(super) fn spawn<T: Transport>(shared: Arc<Shared<T>>, interval: Duration) -> Self {
        let token = shared.polling.clone();
        let handle = tokio::spawn(run(shared, interval, token.clone()));
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Cancels the loop and waits for it to exit.
    pub(super) async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(err) = handle.await
        {
            tracing::warn!(error = %err, "Poll task ended abnormally");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run<T: Transport>(shared: Arc<Shared<T>>, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(host = %shared.profile.host, ?interval, "Poll loop started");

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
            () = shared.refresh_requested.notified() => {
                tracing::debug!(host = %shared.profile.host, "Out-of-cycle refresh");
                ticker.reset();
            }
        }

        tokio::select! {
            () = token.cancelled() => break,
            result = shared.refresh() => {
                // Availability and events are already updated by refresh()
                if let Err(err) = result
                    && err.is_auth_failure()
                {
                    break;
                }
            }
        }
    }

    tracing::debug!(host = %shared.profile.host, "Poll loop stopped");
}
