//! Owned repeating timer for preview playback.
//!
//! Wraps a `crossbeam_channel::tick` receiver. There is no background
//! thread: ticks are computed lazily when the receiver is polled, so
//! dropping the timer is all cancellation needs.
//!
//! Each timer carries the epoch of the session that created it. The event
//! loop hands the epoch back with every tick and the controller ignores
//! ticks whose epoch is no longer live. That covers the window where a
//! cloned receiver is still in a `select!` after `stop()` dropped the timer.

use crossbeam_channel::{Receiver, tick};
use std::time::{Duration, Instant};

/// Tick receiver paired with the epoch of its session
#[derive(Clone, Debug)]
pub struct TickSource {
    pub epoch: u64,
    pub ticks: Receiver<Instant>,
}

/// Repeating timer owned by exactly one playback session
#[derive(Debug)]
pub struct RepeatingTimer {
    epoch: u64,
    interval: Duration,
    ticks: Receiver<Instant>,
}

impl RepeatingTimer {
    /// Start ticking every `interval`. First tick arrives one interval from now.
    pub fn start(epoch: u64, interval: Duration) -> Self {
        Self {
            epoch,
            interval,
            ticks: tick(interval),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Handle for an event loop to wait on.
    pub fn source(&self) -> TickSource {
        TickSource {
            epoch: self.epoch,
            ticks: self.ticks.clone(),
        }
    }
}
