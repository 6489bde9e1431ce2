//! Flush Statistics
//!
//! Counters kept by a [`QueueManager`](crate::queue::QueueManager) across its
//! lifetime. Snapshots are cheap copies.

use std::time::{Duration, Instant};
use crate::queue::FlushTrigger;

/// Statistics for a queue manager
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushStatistics {
    /// Items accepted by `append`
    pub items_appended: u64,

    /// Items promoted from pending to main
    pub items_moved: u64,

    /// Flushes caused by reaching the threshold
    pub threshold_flushes: u64,

    /// Flushes caused by the timer or `flush_now`
    pub periodic_flushes: u64,

    /// Periodic flushes that found nothing pending
    pub empty_flushes: u64,

    /// Largest batch moved by a single flush
    pub largest_batch: usize,

    /// When the last non-empty flush happened
    pub last_flush: Option<Instant>,

    /// Periodic timers spawned by `start_periodic_flush`
    pub timers_started: u64,
}

impl FlushStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_append(&mut self) {
        self.items_appended += 1;
    }

    pub(crate) fn record_timer_start(&mut self) {
        self.timers_started += 1;
    }

    pub(crate) fn record_flush(&mut self, trigger: FlushTrigger, moved: usize) {
        if moved == 0 {
            self.empty_flushes += 1;
            return;
        }

        match trigger {
            FlushTrigger::Threshold => self.threshold_flushes += 1,
            FlushTrigger::Periodic => self.periodic_flushes += 1,
        }
        self.items_moved += moved as u64;
        self.largest_batch = self.largest_batch.max(moved);
        self.last_flush = Some(Instant::now());
    }

    /// Total non-empty flushes
    pub fn total_flushes(&self) -> u64 {
        self.threshold_flushes + self.periodic_flushes
    }

    pub fn average_batch_size(&self) -> f64 {
        match self.total_flushes() {
            0 => 0.0,
            flushes => self.items_moved as f64 / flushes as f64,
        }
    }

    /// Time since the last non-empty flush
    pub fn since_last_flush(&self) -> Option<Duration> {
        self.last_flush.map(|at| at.elapsed())
    }
}
