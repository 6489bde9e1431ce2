//! Comment feed: the items produced by the simulator and the list view
//! that consumes flush events

use std::cmp::Ordering;
use std::fmt;
use std::sync::Weak;
use log::{debug, info};
use parking_lot::Mutex;
use crate::queue::{ContainerSelect, FlushEvent, FlushObserver, QueueManager};

/// A numbered chat comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub no: u64,
    pub content: String,
}

impl Comment {
    pub fn new(no: u64, content: impl Into<String>) -> Self {
        Self {
            no,
            content: content.into(),
        }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No: {}, Content: {}", self.no, self.content)
    }
}

/// Produces consecutively numbered comments
#[derive(Debug, Default)]
pub struct CommentSource {
    last_no: u64,
    shuffle_state: u64,
}

impl CommentSource {
    /// Source whose bulk batches are shuffled differently on every run
    pub fn new() -> Self {
        let seed = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default() as u64;
        Self::with_seed(seed)
    }

    /// Source whose bulk batches are shuffled reproducibly from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            last_no: 0,
            shuffle_state: seed,
        }
    }

    pub fn last_no(&self) -> u64 {
        self.last_no
    }

    /// Next single comment
    pub fn next_comment(&mut self) -> Comment {
        self.last_no += 1;
        Comment::new(self.last_no, format!("New message {}", self.last_no))
    }

    /// Next `size` comments, numbered consecutively and then shuffled
    pub fn next_batch(&mut self, size: usize) -> Vec<Comment> {
        let mut batch: Vec<Comment> = (0..size)
            .map(|_| {
                self.last_no += 1;
                Comment::new(self.last_no, format!("Bulk message {}", self.last_no))
            })
            .collect();
        shuffle_seeded(&mut batch, next_random(&mut self.shuffle_state));
        batch
    }
}

/// One SplitMix64 step
fn next_random(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fisher-Yates shuffle of `items`; the same seed gives the same order
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut state = seed;
    for i in (1..items.len()).rev() {
        let j = (next_random(&mut state) % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

/// How the view applied a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Rows inserted for the moved items only
    Incremental { rows: usize },
    /// Whole list re-sorted and reloaded
    Reload { rows: usize },
}

/// Counters describing how the view was kept in sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewStats {
    pub incremental_updates: usize,
    pub rows_inserted: usize,
    pub full_reloads: usize,
}

/// Rendered list mirroring the manager's main container.
///
/// Periodic flushes insert rows for just the moved comments; threshold
/// flushes re-sort main by comment number and reload every row.
pub struct FeedView {
    manager: Weak<QueueManager<Comment>>,
    insert_at_top: bool,
    rows: Mutex<Vec<String>>,
    updates: Mutex<Vec<ViewUpdate>>,
}

impl FeedView {
    pub fn new(manager: Weak<QueueManager<Comment>>, insert_at_top: bool) -> Self {
        Self {
            manager,
            insert_at_top,
            rows: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Rendered rows, top to bottom
    pub fn rows(&self) -> Vec<String> {
        self.rows.lock().clone()
    }

    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().clone()
    }

    pub fn stats(&self) -> ViewStats {
        self.updates
            .lock()
            .iter()
            .fold(ViewStats::default(), |mut stats, update| {
                match update {
                    ViewUpdate::Incremental { rows } => {
                        stats.incremental_updates += 1;
                        stats.rows_inserted += rows;
                    }
                    ViewUpdate::Reload { .. } => stats.full_reloads += 1,
                }
                stats
            })
    }

    /// Whether the rendered rows match main right now
    pub fn is_consistent_with(&self, manager: &QueueManager<Comment>) -> bool {
        let expected: Vec<String> = manager
            .get_all(ContainerSelect::Main)
            .iter()
            .map(Comment::to_string)
            .collect();
        *self.rows.lock() == expected
    }

    fn display_order(&self, a: &Comment, b: &Comment) -> Ordering {
        if self.insert_at_top {
            b.no.cmp(&a.no)
        } else {
            a.no.cmp(&b.no)
        }
    }

    fn reload(&self, manager: &QueueManager<Comment>) -> usize {
        manager.sort(ContainerSelect::Main, |a, b| self.display_order(a, b));
        let rendered: Vec<String> = manager
            .get_all(ContainerSelect::Main)
            .iter()
            .map(Comment::to_string)
            .collect();
        let count = rendered.len();
        *self.rows.lock() = rendered;
        count
    }

    fn insert_rows(&self, moved: &[Comment]) -> usize {
        let mut rows = self.rows.lock();
        if self.insert_at_top {
            rows.splice(0..0, moved.iter().rev().map(Comment::to_string));
        } else {
            rows.extend(moved.iter().map(Comment::to_string));
        }
        moved.len()
    }
}

impl FlushObserver<Comment> for FeedView {
    fn on_flush(&self, event: &FlushEvent<'_, Comment>) {
        let update = if event.is_queue_full() {
            match self.manager.upgrade() {
                Some(manager) => ViewUpdate::Reload {
                    rows: self.reload(&manager),
                },
                None => return,
            }
        } else {
            ViewUpdate::Incremental {
                rows: self.insert_rows(event.moved()),
            }
        };

        match update {
            ViewUpdate::Reload { rows } => info!("Reloaded view with {} rows", rows),
            ViewUpdate::Incremental { rows } => debug!(
                "Inserted {} rows at the {}",
                rows,
                if self.insert_at_top { "top" } else { "bottom" }
            ),
        }
        self.updates.lock().push(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FlushConfig;
    use std::sync::Arc;
    use std::collections::HashSet;
    use std::time::Duration;

    fn manager_with_view(threshold: usize, insert_at_top: bool) -> (Arc<QueueManager<Comment>>, Arc<FeedView>) {
        let config = FlushConfig::new(threshold, Duration::from_secs(60), insert_at_top);
        let manager = Arc::new(QueueManager::with_config(config).unwrap());
        let view = Arc::new(FeedView::new(Arc::downgrade(&manager), insert_at_top));
        manager.set_observer(view.clone());
        (manager, view)
    }

    #[test]
    fn test_comment_display() {
        assert_eq!(Comment::new(3, "hi").to_string(), "No: 3, Content: hi");
    }

    #[test]
    fn test_source_numbers_consecutively() {
        let mut source = CommentSource::new();
        assert_eq!(source.next_comment().no, 1);
        let batch = source.next_batch(10);
        assert_eq!(source.last_no(), 11);

        let mut numbers: Vec<u64> = batch.iter().map(|c| c.no).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (2..=11).collect::<Vec<_>>());
        assert!(batch.iter().all(|c| c.content.starts_with("Bulk message")));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        for len in 0..30usize {
            let items: Vec<usize> = (0..len).collect();
            let mut shuffled = items.clone();
            shuffle_seeded(&mut shuffled, 17);
            shuffled.sort_unstable();
            assert_eq!(shuffled, items);
        }
    }

    #[test]
    fn test_shuffle_is_reproducible_per_seed() {
        let items: Vec<u32> = (0..10).collect();
        let shuffle = |seed| {
            let mut shuffled = items.clone();
            shuffle_seeded(&mut shuffled, seed);
            shuffled
        };

        assert_eq!(shuffle(42), shuffle(42));
        assert_ne!(shuffle(42), items);

        let orders: HashSet<Vec<u32>> = (0..8).map(shuffle).collect();
        assert!(orders.len() > 1, "every seed produced the same order");
    }

    #[test]
    fn test_bulk_batches_vary_between_batches() {
        let mut source = CommentSource::with_seed(7);
        let numbers = |batch: Vec<Comment>| -> Vec<u64> { batch.iter().map(|c| c.no % 10).collect() };

        let batches: HashSet<Vec<u64>> = (0..4).map(|_| numbers(source.next_batch(10))).collect();
        assert!(batches.len() > 1);
        assert_eq!(source.last_no(), 40);

        let mut replay = CommentSource::with_seed(7);
        let mut again = CommentSource::with_seed(7);
        assert_eq!(replay.next_batch(10), again.next_batch(10));
    }

    #[test]
    fn test_periodic_flush_inserts_rows_at_top() {
        let (manager, view) = manager_with_view(10, true);
        let mut source = CommentSource::new();
        manager.append(source.next_comment());
        manager.append(source.next_comment());
        manager.flush_now();

        assert_eq!(
            view.rows(),
            vec!["No: 2, Content: New message 2", "No: 1, Content: New message 1"]
        );
        assert_eq!(view.updates(), vec![ViewUpdate::Incremental { rows: 2 }]);
        assert!(view.is_consistent_with(&manager));
    }

    #[test]
    fn test_threshold_flush_reloads_sorted() {
        let (manager, view) = manager_with_view(10, true);
        let mut source = CommentSource::new();
        manager.append_all(source.next_batch(10));

        let numbers: Vec<u64> = manager.get_all(ContainerSelect::Main).iter().map(|c| c.no).collect();
        assert_eq!(numbers, (1..=10).rev().collect::<Vec<_>>());
        assert_eq!(view.stats().full_reloads, 1);
        assert!(view.is_consistent_with(&manager));
    }

    #[test]
    fn test_mixed_updates_stay_consistent_at_bottom() {
        let (manager, view) = manager_with_view(4, false);
        let mut source = CommentSource::new();

        manager.append(source.next_comment());
        manager.flush_now();
        manager.append_all(source.next_batch(4));
        manager.append(source.next_comment());
        manager.flush_now();

        let stats = view.stats();
        assert_eq!(stats.incremental_updates, 2);
        assert_eq!(stats.rows_inserted, 2);
        assert_eq!(stats.full_reloads, 1);
        assert!(view.is_consistent_with(&manager));
    }
}
