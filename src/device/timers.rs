// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable auto-revert timers.
//!
//! At most one timer is pending per `(switch, kind)`. Scheduling a timer
//! for a key that already has one cancels the old timer first, so a
//! superseded revert never runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::types::SwitchId;

/// What a timer reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TimerKind {
    /// Turns a pulse switch back off after its pulse window.
    PulseOff,
    /// Clears the release indicator after the release window.
    ReleaseReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TimerKey {
    switch: SwitchId,
    kind: TimerKind,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_generation: u64,
    pending: HashMap<TimerKey, PendingTimer>,
}

/// Owns every pending timer of one intercom.
#[derive(Debug)]
pub(crate) struct Timers {
    table: Arc<Mutex<TimerTable>>,
    /// Parent of every timer token; cancelled on shutdown.
    root: CancellationToken,
}

impl Timers {
    pub(crate) fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(TimerTable::default())),
            root: CancellationToken::new(),
        }
    }

    /// Runs `on_fire` after `delay` unless cancelled first.
    ///
    /// `on_fire` runs with the timer table locked: a concurrent `cancel`
    /// either wins and the callback never runs, or waits until it is done.
    /// The callback must not touch the timers itself.
    pub(crate) fn schedule<F>(&self, switch: SwitchId, kind: TimerKind, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_closed() {
            tracing::debug!(switch = %switch, ?kind, "Timers closed, not scheduling");
            return;
        }

        let key = TimerKey { switch, kind };
        let token = self.root.child_token();

        let generation = {
            let mut table = self.table.lock();
            let generation = table.next_generation;
            table.next_generation = table.next_generation.wrapping_add(1);
            let previous = table.pending.insert(
                key,
                PendingTimer {
                    generation,
                    token: token.clone(),
                },
            );
            if let Some(previous) = previous {
                previous.token.cancel();
            }
            generation
        };

        let table = Arc::clone(&self.table);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let mut guard = table.lock();
                    let current = guard
                        .pending
                        .get(&key)
                        .is_some_and(|t| t.generation == generation && !t.token.is_cancelled());
                    if current {
                        guard.pending.remove(&key);
                        on_fire();
                    }
                }
            }
        });

        tracing::debug!(switch = %switch, ?kind, ?delay, "Scheduled timer");
    }

    /// Cancels the pending timer for a switch, if any.
    ///
    /// Returns `true` if a timer was pending.
    pub(crate) fn cancel(&self, switch: SwitchId, kind: TimerKind) -> bool {
        let removed = self.table.lock().pending.remove(&TimerKey { switch, kind });
        match removed {
            Some(timer) => {
                timer.token.cancel();
                tracing::debug!(switch = %switch, ?kind, "Cancelled timer");
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a timer is pending for the switch.
    #[cfg(test)]
    pub(crate) fn is_pending(&self, switch: SwitchId, kind: TimerKind) -> bool {
        self.table
            .lock()
            .pending
            .contains_key(&TimerKey { switch, kind })
    }

    /// Returns `true` once [`cancel_all`](Self::cancel_all) has run.
    pub(crate) fn is_closed(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Cancels every pending timer.
    pub(crate) fn cancel_all(&self) {
        self.root.cancel();
        self.table.lock().pending.clear();
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_delay() {
        let timers = Timers::new();
        let (count, on_fire) = counter();

        timers.schedule(SwitchId::one(), TimerKind::PulseOff, Duration::from_secs(1), on_fire);
        assert!(timers.is_pending(SwitchId::one(), TimerKind::PulseOff));

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timers.is_pending(SwitchId::one(), TimerKind::PulseOff));
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_after_cancel_all_is_ignored() {
        let timers = Timers::new();
        let (count, on_fire) = counter();

        timers.cancel_all();
        assert!(timers.is_closed());
        timers.schedule(SwitchId::one(), TimerKind::PulseOff, Duration::from_secs(1), on_fire);
        assert!(!timers.is_pending(SwitchId::one(), TimerKind::PulseOff));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let timers = Timers::new();
        let (count, on_fire) = counter();

        timers.schedule(SwitchId::one(), TimerKind::ReleaseReset, Duration::from_secs(1), on_fire);
        assert!(timers.cancel(SwitchId::one(), TimerKind::ReleaseReset));
        assert!(!timers.cancel(SwitchId::one(), TimerKind::ReleaseReset));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_timer() {
        let timers = Timers::new();
        let (first, first_fire) = counter();
        let (second, second_fire) = counter();
        let id = SwitchId::new(2).unwrap();

        timers.schedule(id, TimerKind::PulseOff, Duration::from_secs(1), first_fire);
        tokio::time::sleep(Duration::from_millis(500)).await;
        timers.schedule(id, TimerKind::PulseOff, Duration::from_secs(1), second_fire);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn kinds_are_independent() {
        let timers = Timers::new();
        let (pulse, pulse_fire) = counter();
        let (release, release_fire) = counter();

        timers.schedule(SwitchId::one(), TimerKind::PulseOff, Duration::from_secs(1), pulse_fire);
        timers.schedule(
            SwitchId::one(),
            TimerKind::ReleaseReset,
            Duration::from_secs(1),
            release_fire,
        );
        timers.cancel(SwitchId::one(), TimerKind::PulseOff);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(pulse.load(Ordering::SeqCst), 0);
        assert_eq!(release.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_everything() {
        let timers = Timers::new();
        let (count, on_fire) = counter();
        let (count2, on_fire2) = counter();

        timers.schedule(SwitchId::one(), TimerKind::PulseOff, Duration::from_secs(1), on_fire);
        timers.schedule(
            SwitchId::new(3).unwrap(),
            TimerKind::ReleaseReset,
            Duration::from_secs(1),
            on_fire2,
        );
        timers.cancel_all();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(count2.load(Ordering::SeqCst), 0);
    }
}
