//! Time capabilities used by the countdown: periodic ticks and "now".
//!
//! Both are traits so the widget can be driven without real wall-clock
//! delays. The defaults use `bubbletea_rs::tick` and the system clock.

use crate::countdown::TickMsg;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Produces the command that delivers one periodic tick.
///
/// The countdown re-schedules after every tick it accepts, so a scheduler
/// only ever needs to deliver a single message per call. Cancellation is
/// handled by the countdown itself: ticks carrying a stale handle are dropped.
pub trait Scheduler: Send + Sync {
    /// Returns a command that yields `tick` after `period`.
    fn schedule(&self, period: Duration, tick: TickMsg) -> Cmd;
}

/// Schedules ticks on the bubbletea runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeaScheduler;

impl Scheduler for TeaScheduler {
    fn schedule(&self, period: Duration, tick: TickMsg) -> Cmd {
        bubbletea_tick(period, move |_| Box::new(tick.clone()) as Msg)
    }
}

/// Delivers ticks as soon as the command is polled, ignoring the period.
///
/// Useful for tests and simulations that step the countdown by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, _period: Duration, tick: TickMsg) -> Cmd {
        Box::pin(async move { Some(Box::new(tick) as Msg) })
    }
}

/// Source of the current time for target-timestamp countdowns.
pub trait TimeSource: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcNow;

impl TimeSource for UtcNow {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable time source. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualTime {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualTime {
    /// Starts at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    /// Moves forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned lock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

pub(crate) fn default_scheduler() -> Arc<dyn Scheduler> {
    Arc::new(TeaScheduler)
}

pub(crate) fn default_time_source() -> Arc<dyn TimeSource> {
    Arc::new(UtcNow)
}
