// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Management of several intercoms.
//!
//! [`IntercomManager`] is the explicit per-host context that owns every
//! configured intercom. Hosts set entries up from an
//! [`IntercomConfig`](crate::config::IntercomConfig), look them up by
//! [`EntryId`] and unload them when the configuration goes away.
//!
//! # Examples
//!
//! ```no_run
//! use intercom_lib::config::IntercomConfig;
//! use intercom_lib::manager::IntercomManager;
//!
//! # async fn example() -> intercom_lib::Result<()> {
//! let manager = IntercomManager::new();
//!
//! let front = manager.setup(IntercomConfig::new("192.168.1.50")).await?;
//! let back = manager
//!     .setup(IntercomConfig::new("192.168.1.51").with_credentials("api", "secret"))
//!     .await?;
//!
//! if let Some(intercom) = manager.get(front).await {
//!     let mut status = intercom.watch();
//!     tokio::spawn(async move {
//!         while status.changed().await.is_ok() {
//!             println!("door: {:?}", status.borrow().door());
//!         }
//!     });
//! }
//!
//! manager.unload(back).await?;
//! manager.shutdown_all().await;
//! # Ok(())
//! # }
//! ```

mod entry_id;
mod intercom_manager;

pub use entry_id::EntryId;
pub use intercom_manager::IntercomManager;
