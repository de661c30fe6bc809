//! Scheduler — deadline timers as tokio tasks feeding the event queue.
//!
//! A timer is a task that sleeps, then enqueues
//! [`BridgeEvent::TimerFired`]. Cancelling aborts the task; the owning
//! circuit also forgets the id, so a firing that raced the abort into the
//! queue is recognised as stale.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use unibridge_domain::alias::Alias;
use unibridge_domain::gesture::{TimerId, TimerKind, Timers};

use crate::event_queue::{BridgeEvent, EventSender};

pub struct Scheduler {
    sender: EventSender,
    next_id: u64,
    pending: HashMap<TimerId, AbortHandle>,
}

impl Scheduler {
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            next_id: 0,
            pending: HashMap::new(),
        }
    }

    /// Forget a timer whose firing has been delivered.
    pub fn complete(&mut self, timer: TimerId) {
        self.pending.remove(&timer);
    }

    /// Number of armed timers that have neither fired nor been cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Enqueue [`BridgeEvent::Reconnect`] after `delay`.
    #[must_use]
    pub fn schedule_reconnect(&self, delay: Duration) -> AbortHandle {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send(BridgeEvent::Reconnect);
        })
        .abort_handle()
    }

    /// Enqueue [`BridgeEvent::WatchdogTick`] every `period`, starting one
    /// period from now.
    #[must_use]
    pub fn spawn_watchdog(&self, period: Duration) -> AbortHandle {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !sender.send(BridgeEvent::WatchdogTick) {
                    break;
                }
            }
        })
        .abort_handle()
    }

    /// Abort every armed timer.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

impl Timers for Scheduler {
    fn arm(&mut self, alias: &Alias, kind: TimerKind, delay: Duration) -> TimerId {
        self.next_id += 1;
        let timer = TimerId(self.next_id);
        let sender = self.sender.clone();
        let alias = alias.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send(BridgeEvent::TimerFired { alias, kind, timer });
        });
        tracing::trace!(%timer, ?kind, ?delay, "timer armed");
        self.pending.insert(timer, handle.abort_handle());
        timer
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(handle) = self.pending.remove(&timer) {
            handle.abort();
            tracing::trace!(%timer, "timer cancelled");
        }
    }
}
