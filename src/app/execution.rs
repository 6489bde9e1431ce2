//! Feed execution: drives a queue manager with produced comments and
//! reports how the view kept up

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use crate::config::{AppConfig, FeedSettings};
use crate::queue::{format_flush_statistics, FlushStatistics, QueueDebug, QueueManager};
use super::feed::{Comment, CommentSource, FeedView, ViewStats};

/// Outcome of a feed run
#[derive(Debug, Clone)]
pub struct FeedSummary {
    pub produced: u64,
    pub rows: usize,
    pub pending_left: usize,
    pub view: ViewStats,
    pub statistics: FlushStatistics,
    pub consistent: bool,
    pub elapsed: Duration,
}

impl FeedSummary {
    pub fn report(&self) -> String {
        format!(
            "Produced {} comments in {:.2?}: {} rows shown, {} still pending\n\
             View: {} incremental updates ({} rows), {} full reloads, {}\n\
             {}",
            self.produced,
            self.elapsed,
            self.rows,
            self.pending_left,
            self.view.incremental_updates,
            self.view.rows_inserted,
            self.view.full_reloads,
            if self.consistent { "in sync with main" } else { "OUT OF SYNC with main" },
            format_flush_statistics(&self.statistics)
        )
    }
}

fn produce(manager: &QueueManager<Comment>, feed: &FeedSettings) -> u64 {
    let mut source = CommentSource::new();
    let pause = Duration::from_millis(feed.produce_interval_ms);

    while (source.last_no() as usize) < feed.messages {
        let remaining = feed.messages - source.last_no() as usize;
        if feed.bulk {
            let batch = source.next_batch(remaining.min(feed.bulk_size));
            debug!("Appending shuffled batch of {}", batch.len());
            manager.append_all(batch);
        } else {
            manager.append(source.next_comment());
        }

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }

    source.last_no()
}

/// Wait until the periodic timer has promoted everything pending
fn drain(manager: &QueueManager<Comment>, timeout: Duration) -> bool {
    let poll_interval = Duration::from_millis(10);
    let deadline = Instant::now() + timeout;

    while manager.pending_count() > 0 {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(poll_interval);
    }
    true
}

/// Run the feed described by `config` to completion
pub fn run_feed(config: &AppConfig) -> Result<FeedSummary> {
    let manager = Arc::new(
        QueueManager::with_config(config.queue.clone()).context("Failed to create queue manager")?,
    );
    let view = Arc::new(FeedView::new(Arc::downgrade(&manager), config.queue.insert_at_top));
    manager.set_observer(view.clone());

    info!(
        "Starting feed of {} comments ({}), threshold {}, interval {:?}",
        config.feed.messages,
        if config.feed.bulk { "bulk" } else { "single" },
        config.queue.queue_threshold,
        config.queue.flush_interval()
    );

    let started = Instant::now();
    manager.start_periodic_flush();
    let produced = produce(&manager, &config.feed);
    debug!("{}", manager.debug_status());

    let drain_timeout = (config.queue.flush_interval() * 3).max(Duration::from_secs(1));
    if !drain(&manager, drain_timeout) {
        warn!("Timer did not drain {} pending comments", manager.pending_count());
    }
    manager.stop_periodic_flush();
    let elapsed = started.elapsed();

    let summary = FeedSummary {
        produced,
        rows: view.rows().len(),
        pending_left: manager.pending_count(),
        view: view.stats(),
        statistics: manager.statistics(),
        consistent: view.is_consistent_with(&manager),
        elapsed,
    };

    if !summary.consistent {
        warn!("View rows diverged from main container");
    }
    info!("Feed finished: {}", manager.debug_status());

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FlushConfig;

    fn quick_config(threshold: usize, insert_at_top: bool, bulk: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.queue = FlushConfig::new(threshold, Duration::from_millis(20), insert_at_top);
        config.feed = FeedSettings {
            messages: 35,
            bulk,
            bulk_size: 10,
            produce_interval_ms: 0,
        };
        config
    }

    #[test]
    fn test_single_feed_shows_every_comment() {
        let summary = run_feed(&quick_config(10, true, false)).unwrap();

        assert_eq!(summary.produced, 35);
        assert_eq!(summary.rows, 35);
        assert_eq!(summary.pending_left, 0);
        assert!(summary.consistent);
        assert_eq!(summary.statistics.items_moved, 35);
        // Each flush moves fewer than threshold + 1 items
        let stats = &summary.statistics;
        assert!(stats.threshold_flushes + stats.periodic_flushes >= 4);
    }

    #[test]
    fn test_bulk_feed_reloads_on_threshold() {
        let summary = run_feed(&quick_config(10, false, true)).unwrap();

        assert_eq!(summary.produced, 35);
        assert_eq!(summary.rows, 35);
        assert!(summary.view.full_reloads >= 1);
        assert!(summary.consistent);
    }

    #[test]
    fn test_report_mentions_sync_state() {
        let summary = run_feed(&quick_config(5, false, false)).unwrap();
        let report = summary.report();
        assert!(report.contains("Produced 35 comments"));
        assert!(report.contains("in sync with main"));
    }
}
