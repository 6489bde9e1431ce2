//! Simple Debug and Logging Support
//!
//! Provides status strings for queue managers and the logging macros used by
//! the queue internals.

use std::fmt::Write;
use crate::queue::{FlushStatistics, QueueManager};

/// Debug trait for queue components
pub trait QueueDebug {
    /// Get a simple one-line status string
    fn debug_status(&self) -> String;

    /// Get detailed debug information
    fn debug_info(&self) -> String;
}

impl<T> QueueDebug for QueueManager<T>
where
    T: Clone + Send + 'static,
{
    fn debug_status(&self) -> String {
        format!(
            "Queue: {} pending / {} threshold, {} main, timer={}",
            self.pending_count(),
            self.config().queue_threshold,
            self.main_count(),
            if self.is_flushing_periodically() { "running" } else { "stopped" }
        )
    }

    fn debug_info(&self) -> String {
        let config = self.config();
        let mut info = String::new();
        let _ = writeln!(info, "=== Queue Manager Debug Info ===");
        let _ = writeln!(info, "Pending: {} / {} threshold", self.pending_count(), config.queue_threshold);
        let _ = writeln!(info, "Main: {}", self.main_count());
        let _ = writeln!(
            info,
            "Flush interval: {:?} ({})",
            config.flush_interval(),
            if self.is_flushing_periodically() { "running" } else { "stopped" }
        );
        let _ = writeln!(
            info,
            "Insert position: {}",
            if config.insert_at_top { "top" } else { "bottom" }
        );
        let _ = writeln!(info, "{}", format_flush_statistics(&self.statistics()));
        info
    }
}

/// Format flush statistics for logging
pub fn format_flush_statistics(stats: &FlushStatistics) -> String {
    format!(
        "Flushes: {} threshold, {} periodic, {} empty, {} moved, {:.2} avg batch, {} largest",
        stats.threshold_flushes,
        stats.periodic_flushes,
        stats.empty_flushes,
        stats.items_moved,
        stats.average_batch_size(),
        stats.largest_batch
    )
}

/// Simple logging macros for queue operations
#[macro_export]
macro_rules! queue_trace {
    ($($arg:tt)*) => {
        log::trace!(target: "listqueue::queue", $($arg)*);
    };
}

#[macro_export]
macro_rules! queue_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "listqueue::queue", $($arg)*);
    };
}

#[macro_export]
macro_rules! queue_info {
    ($($arg:tt)*) => {
        log::info!(target: "listqueue::queue", $($arg)*);
    };
}

#[macro_export]
macro_rules! queue_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "listqueue::queue", $($arg)*);
    };
}

#[macro_export]
macro_rules! queue_error {
    ($($arg:tt)*) => {
        log::error!(target: "listqueue::queue", $($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{FlushConfig, FlushTrigger};
    use std::time::Duration;

    #[test]
    fn test_debug_status() {
        let manager = QueueManager::with_config(FlushConfig::new(5, Duration::from_secs(1), false)).unwrap();
        manager.append(1u32);
        manager.append(2u32);

        let status = manager.debug_status();
        assert_eq!(status, "Queue: 2 pending / 5 threshold, 0 main, timer=stopped");
    }

    #[test]
    fn test_debug_info() {
        let manager: QueueManager<u32> = QueueManager::new();

        let info = manager.debug_info();
        assert!(info.contains("Queue Manager Debug Info"));
        assert!(info.contains("Pending: 0 / 50 threshold"));
        assert!(info.contains("Insert position: bottom"));
        assert!(info.contains("Flushes:"));
    }

    #[test]
    fn test_format_flush_statistics() {
        let mut stats = FlushStatistics::new();
        stats.record_flush(FlushTrigger::Threshold, 10);
        stats.record_flush(FlushTrigger::Periodic, 0);

        let formatted = format_flush_statistics(&stats);
        assert!(formatted.contains("1 threshold"));
        assert!(formatted.contains("1 empty"));
        assert!(formatted.contains("10 moved"));
        assert!(formatted.contains("10.00 avg batch"));
    }
}
