// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of running intercom sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::IntercomConfig;
use crate::device::{Intercom, IntercomBuilder};
use crate::error::Error;
use crate::protocol::{HttpClient, Transport};

use super::EntryId;

/// Owns the intercom sessions of a host, keyed by [`EntryId`].
///
/// Sessions are handed out as `Arc`s; unloading an entry shuts its session
/// down even while other handles are still alive.
///
/// # Examples
///
/// ```no_run
/// use intercom_lib::config::IntercomConfig;
/// use intercom_lib::manager::IntercomManager;
///
/// # async fn example() -> intercom_lib::Result<()> {
/// let manager = IntercomManager::new();
/// let id = manager.setup(IntercomConfig::new("192.168.1.50")).await?;
///
/// if let Some(intercom) = manager.get(id).await {
///     intercom.unlock_door().await?;
/// }
///
/// manager.unload(id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IntercomManager<T: Transport = HttpClient> {
    entries: RwLock<HashMap<EntryId, Arc<Intercom<T>>>>,
}

impl<T: Transport> IntercomManager<T> {
    /// Registers an already built session.
    pub async fn insert(&self, intercom: Intercom<T>) -> EntryId {
        let id = EntryId::new();
        tracing::debug!(entry = %id, host = %intercom.host(), "Registered intercom");
        self.entries.write().await.insert(id, Arc::new(intercom));
        id
    }

    /// Builds a session over a custom transport and registers it.
    ///
    /// # Errors
    ///
    /// Returns the setup error; nothing is registered in that case.
    pub async fn setup_with_transport(
        &self,
        config: IntercomConfig,
        transport: T,
    ) -> Result<EntryId, Error> {
        let intercom = IntercomBuilder::new(config)
            .build_with_transport(transport)
            .await?;
        Ok(self.insert(intercom).await)
    }

    /// Returns the session of an entry.
    pub async fn get(&self, id: EntryId) -> Option<Arc<Intercom<T>>> {
        self.entries.read().await.get(&id).cloned()
    }

    /// Returns the ids of all entries.
    pub async fn entry_ids(&self) -> Vec<EntryId> {
        self.entries.read().await.keys().copied().collect()
    }

    /// Returns the number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no entry is registered.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes an entry and shuts its session down.
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the entry does not exist, which
    /// includes entries that were already unloaded.
    pub async fn unload(&self, id: EntryId) -> Result<(), Error> {
        let intercom = self
            .entries
            .write()
            .await
            .remove(&id)
            .ok_or(Error::EntryNotFound)?;

        tracing::debug!(entry = %id, "Unloading intercom");
        shut_down(intercom).await;
        Ok(())
    }

    /// Shuts every session down and empties the manager.
    pub async fn shutdown_all(&self) {
        let drained: Vec<_> = self.entries.write().await.drain().collect();
        for (id, intercom) in drained {
            tracing::debug!(entry = %id, "Unloading intercom");
            shut_down(intercom).await;
        }
    }
}

impl IntercomManager<HttpClient> {
    /// Creates an empty manager for HTTP intercoms.
    ///
    /// Managers over other transports are created with `default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects to an intercom over HTTP and registers it.
    ///
    /// The initial poll must succeed.
    ///
    /// # Errors
    ///
    /// Returns the setup error, e.g. an authentication failure; nothing is
    /// registered in that case.
    pub async fn setup(&self, config: IntercomConfig) -> Result<EntryId, Error> {
        let intercom = IntercomBuilder::new(config).build().await?;
        Ok(self.insert(intercom).await)
    }
}

impl<T: Transport> Default for IntercomManager<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

async fn shut_down<T: Transport>(intercom: Arc<Intercom<T>>) {
    match Arc::try_unwrap(intercom) {
        Ok(intercom) => intercom.shutdown().await,
        Err(shared) => shared.close().await,
    }
}
