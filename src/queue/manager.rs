//! QueueManager - staged promotion of items into a visible list
//!
//! Items are appended to a *pending* container and promoted in bulk to the
//! *main* container either when pending reaches the configured threshold
//! (synchronously, inside `append`) or when the periodic timer fires. Each
//! non-empty promotion is reported once to the registered observer.
//!
//! # Locking
//!
//! Both containers, the statistics and the threshold check live behind a
//! single reentrant mutex that is held for the whole append-or-flush
//! critical section, observer callback included. The observer can therefore
//! call back into the manager from the flushing thread (to read or sort
//! main, for example), while other threads wait until the flush completes.
//! Closures passed to [`QueueManager::filtered`] and [`QueueManager::sort`]
//! run while the state is borrowed and must not call back into the manager.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{self, AtomicBool};
use std::sync::{Arc, Weak};
use std::time::Duration;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use crate::queue::{
    FlushConfig, FlushEvent, FlushObserver, FlushStatistics, FlushTimer, FlushTrigger,
    IndexedContainer, QueueResult,
};

/// How long a timer tick waits for the state lock before re-checking
/// whether the timer is being stopped
const TICK_LOCK_POLL: Duration = Duration::from_millis(10);

/// Upper bound on the capacity reserved up front for pending
const MAX_PENDING_PREALLOCATION: usize = 1024;

/// Selects one of the two containers owned by a [`QueueManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerSelect {
    /// Staging area for items not yet promoted
    Pending,
    /// Promoted, externally visible items
    Main,
}

impl ContainerSelect {
    /// Both containers, pending first
    pub const ALL: [ContainerSelect; 2] = [ContainerSelect::Pending, ContainerSelect::Main];
}

impl fmt::Display for ContainerSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerSelect::Pending => write!(f, "pending"),
            ContainerSelect::Main => write!(f, "main"),
        }
    }
}

struct QueueState<T> {
    pending: IndexedContainer<T>,
    main: IndexedContainer<T>,
    statistics: FlushStatistics,
}

impl<T> QueueState<T> {
    fn container(&self, select: ContainerSelect) -> &IndexedContainer<T> {
        match select {
            ContainerSelect::Pending => &self.pending,
            ContainerSelect::Main => &self.main,
        }
    }

    fn container_mut(&mut self, select: ContainerSelect) -> &mut IndexedContainer<T> {
        match select {
            ContainerSelect::Pending => &mut self.pending,
            ContainerSelect::Main => &mut self.main,
        }
    }
}

/// State shared between the manager and its timer thread
struct Shared<T> {
    config: FlushConfig,
    state: ReentrantMutex<RefCell<QueueState<T>>>,
    observer: RwLock<Option<Arc<dyn FlushObserver<T>>>>,
}

impl<T> Shared<T>
where
    T: Clone + Send + 'static,
{
    /// Promote everything pending into main and notify the observer.
    ///
    /// Must be called with the state lock held; `cell` is the locked state.
    fn flush_locked(&self, cell: &RefCell<QueueState<T>>, trigger: FlushTrigger) -> usize {
        let moved = {
            let mut state = cell.borrow_mut();
            let moved = state.pending.drain_all();
            state.statistics.record_flush(trigger, moved.len());

            if moved.is_empty() {
                crate::queue_trace!("Flush ({:?}) found nothing pending", trigger);
                return 0;
            }

            if self.config.insert_at_top {
                state.main.prepend_each(moved.iter().cloned());
            } else {
                for item in &moved {
                    state.main.append(item.clone());
                }
            }

            crate::queue_debug!(
                "Flushed {} items to main ({:?}), main now holds {}",
                moved.len(),
                trigger,
                state.main.count()
            );
            moved
        };

        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.on_flush(&FlushEvent::new(trigger, &moved));
        }

        moved.len()
    }

    fn flush(&self, trigger: FlushTrigger) -> usize {
        let guard = self.state.lock();
        self.flush_locked(&guard, trigger)
    }

    /// One periodic timer tick. Gives up without flushing if the timer is
    /// stopped while waiting for the state lock.
    fn tick(&self, active: &AtomicBool) {
        loop {
            if !active.load(atomic::Ordering::Acquire) {
                return;
            }
            if let Some(guard) = self.state.try_lock_for(TICK_LOCK_POLL) {
                if active.load(atomic::Ordering::Acquire) {
                    self.flush_locked(&guard, FlushTrigger::Periodic);
                }
                return;
            }
        }
    }
}

/// Buffered list manager with threshold and periodic promotion
///
/// # Example
///
/// ```rust
/// use listqueue::queue::{ContainerSelect, FlushConfig, FlushEvent, QueueManager};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let manager = QueueManager::with_config(FlushConfig::new(3, Duration::from_millis(500), false)).unwrap();
/// manager.set_observer(Arc::new(|event: &FlushEvent<'_, u32>| {
///     println!("moved {} items (full: {})", event.len(), event.is_queue_full());
/// }));
///
/// manager.append(1);
/// manager.append(2);
/// assert_eq!(manager.main_count(), 0);
///
/// manager.append(3); // reaches the threshold
/// assert_eq!(manager.get_all(ContainerSelect::Main), vec![1, 2, 3]);
/// ```
pub struct QueueManager<T> {
    shared: Arc<Shared<T>>,
    timer: Mutex<Option<FlushTimer>>,
}

impl<T> QueueManager<T>
where
    T: Clone + Send + 'static,
{
    /// Create a manager with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(FlushConfig::default())
    }

    /// Create a manager with a validated configuration
    pub fn with_config(config: FlushConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: FlushConfig) -> Self {
        let state = QueueState {
            pending: IndexedContainer::with_capacity(config.queue_threshold.min(MAX_PENDING_PREALLOCATION)),
            main: IndexedContainer::new(),
            statistics: FlushStatistics::new(),
        };

        Self {
            shared: Arc::new(Shared {
                config,
                state: ReentrantMutex::new(RefCell::new(state)),
                observer: RwLock::new(None),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FlushConfig {
        &self.shared.config
    }

    /// Register the observer, replacing any previous one
    pub fn set_observer(&self, observer: Arc<dyn FlushObserver<T>>) {
        *self.shared.observer.write() = Some(observer);
    }

    /// Remove the observer; later flushes still promote items
    pub fn clear_observer(&self) {
        *self.shared.observer.write() = None;
    }

    pub fn has_observer(&self) -> bool {
        self.shared.observer.read().is_some()
    }

    /// Add an item to pending, flushing synchronously if the threshold is reached
    pub fn append(&self, item: T) {
        let guard = self.shared.state.lock();
        let reached = {
            let mut state = guard.borrow_mut();
            state.pending.append(item);
            state.statistics.record_append();
            crate::queue_trace!("Appended item, pending size: {}", state.pending.count());
            state.pending.count() >= self.shared.config.queue_threshold
        };

        if reached {
            self.shared.flush_locked(&guard, FlushTrigger::Threshold);
        }
    }

    /// Append each item in order; every append evaluates the threshold
    pub fn append_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let _guard = self.shared.state.lock();
        for item in items {
            self.append(item);
        }
    }

    /// Perform the same flush a timer tick performs. Returns the number of
    /// items moved.
    pub fn flush_now(&self) -> usize {
        self.shared.flush(FlushTrigger::Periodic)
    }

    /// Start the periodic flush timer. Does nothing if it is already running.
    pub fn start_periodic_flush(&self) {
        let mut slot = self.timer.lock();
        if slot.as_ref().is_some_and(FlushTimer::is_running) {
            crate::queue_debug!("Periodic flush already running");
            return;
        }

        let interval = self.shared.config.flush_interval();
        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let started = FlushTimer::start(interval, move |active| match weak.upgrade() {
            Some(shared) => {
                shared.tick(active);
                true
            }
            None => false,
        });

        match started {
            Ok(timer) => {
                crate::queue_info!("Started periodic flush every {:?}", interval);
                *slot = Some(timer);
            }
            Err(e) => {
                crate::queue_error!("Failed to start periodic flush timer: {}", e);
                return;
            }
        }
        // A tick holds the state lock and may take the timer slot from its observer
        drop(slot);

        let guard = self.shared.state.lock();
        guard.borrow_mut().statistics.record_timer_start();
    }

    /// Stop the periodic flush timer. Safe to call when it is not running.
    ///
    /// When this returns, no further periodic flush will fire.
    pub fn stop_periodic_flush(&self) {
        let timer = self.timer.lock().take();
        if let Some(mut timer) = timer {
            timer.stop();
            crate::queue_info!("Stopped periodic flush after {} ticks", timer.tick_count());
        }
    }

    pub fn is_flushing_periodically(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(FlushTimer::is_running)
    }

    /// Number of promoted items
    pub fn main_count(&self) -> usize {
        self.count(ContainerSelect::Main)
    }

    /// Number of items waiting to be promoted
    pub fn pending_count(&self) -> usize {
        self.count(ContainerSelect::Pending)
    }

    pub fn count(&self, select: ContainerSelect) -> usize {
        let guard = self.shared.state.lock();
        let count = guard.borrow().container(select).count();
        count
    }

    /// Item at `index` of the selected container, or `None` when out of range
    pub fn get_item(&self, select: ContainerSelect, index: usize) -> Option<T> {
        let guard = self.shared.state.lock();
        let item = guard.borrow().container(select).get(index).cloned();
        item
    }

    /// Snapshot of the selected container in order
    pub fn get_all(&self, select: ContainerSelect) -> Vec<T> {
        let guard = self.shared.state.lock();
        let items = guard.borrow().container(select).to_vec();
        items
    }

    /// Most recently promoted item: the top of main when inserting at the
    /// top, otherwise the bottom
    pub fn newest_main(&self) -> Option<T> {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        let newest = if self.shared.config.insert_at_top {
            state.main.first().cloned()
        } else {
            state.main.last().cloned()
        };
        newest
    }

    /// Items of the selected container satisfying `predicate`, in order
    pub fn filtered<P>(&self, select: ContainerSelect, predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        let guard = self.shared.state.lock();
        let items = guard.borrow().container(select).filter(predicate);
        items
    }

    /// Sort the selected container in place (stable)
    pub fn sort<F>(&self, select: ContainerSelect, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let guard = self.shared.state.lock();
        guard.borrow_mut().container_mut(select).sort_by(compare);
    }

    /// Clear the selected container and fill it with `items` in order.
    ///
    /// Replacing pending does not evaluate the threshold.
    pub fn replace_all<I>(&self, select: ContainerSelect, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let guard = self.shared.state.lock();
        guard.borrow_mut().container_mut(select).replace_all(items);
        crate::queue_debug!("Replaced contents of {} container", select);
    }

    /// Overwrite the item at `index` of the selected container
    pub fn replace_at(&self, select: ContainerSelect, index: usize, item: T) -> QueueResult<()> {
        let guard = self.shared.state.lock();
        let result = guard.borrow_mut().container_mut(select).set(index, item);
        result
    }

    /// Clear each selected container
    pub fn clear(&self, selects: &[ContainerSelect]) {
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        for select in selects {
            state.container_mut(*select).clear();
        }
    }

    /// Clear both pending and main
    pub fn clear_all(&self) {
        self.clear(&ContainerSelect::ALL);
    }

    /// Snapshot of the flush counters
    pub fn statistics(&self) -> FlushStatistics {
        let guard = self.shared.state.lock();
        let statistics = guard.borrow().statistics.clone();
        statistics
    }
}

impl<T> Default for QueueManager<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for QueueManager<T> {
    fn drop(&mut self) {
        if let Some(mut timer) = self.timer.get_mut().take() {
            timer.stop();
        }

        let unflushed = self.shared.state.lock().borrow().pending.count();
        if unflushed > 0 {
            crate::queue_warn!("Dropping queue manager with {} unflushed items", unflushed);
        }
    }
}

impl<T> fmt::Debug for QueueManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueManager")
            .field("config", &self.shared.config)
            .field("timer", &*self.timer.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_creation() {
        let manager: QueueManager<u32> = QueueManager::new();
        assert_eq!(manager.config(), &FlushConfig::default());
        assert_eq!(manager.main_count(), 0);
        assert_eq!(manager.pending_count(), 0);
        assert!(!manager.is_flushing_periodically());
        assert!(!manager.has_observer());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result: QueueResult<QueueManager<u32>> =
            QueueManager::with_config(FlushConfig::new(0, Duration::from_secs(1), false));
        assert!(result.is_err());
    }

    #[test]
    fn test_container_select_display() {
        assert_eq!(ContainerSelect::Pending.to_string(), "pending");
        assert_eq!(ContainerSelect::Main.to_string(), "main");
    }

    #[test]
    fn test_newest_main_follows_insert_position() {
        let bottom = QueueManager::with_config(FlushConfig::new(10, Duration::from_secs(1), false)).unwrap();
        bottom.append_all(vec![1, 2, 3]);
        bottom.flush_now();
        assert_eq!(bottom.newest_main(), Some(3));

        let top = QueueManager::with_config(FlushConfig::new(10, Duration::from_secs(1), true)).unwrap();
        top.append_all(vec![1, 2, 3]);
        top.flush_now();
        assert_eq!(top.newest_main(), Some(3));
        assert_eq!(top.get_item(ContainerSelect::Main, 0), Some(3));
    }
}
