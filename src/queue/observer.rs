//! Flush observer
//!
//! A [`QueueManager`](crate::queue::QueueManager) reports every non-empty
//! flush to a single observer. The event borrows the moved batch, so it
//! cannot outlive the callback.

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// Pending reached the configured threshold during an append
    Threshold,
    /// The periodic timer fired, or the owner called `flush_now`
    Periodic,
}

impl FlushTrigger {
    /// Threshold flushes are reported as "queue full"
    pub fn is_queue_full(self) -> bool {
        matches!(self, FlushTrigger::Threshold)
    }
}

/// Payload delivered to the observer once per non-empty flush
#[derive(Debug)]
pub struct FlushEvent<'a, T> {
    trigger: FlushTrigger,
    moved: &'a [T],
}

impl<'a, T> FlushEvent<'a, T> {
    pub(crate) fn new(trigger: FlushTrigger, moved: &'a [T]) -> Self {
        Self { trigger, moved }
    }

    pub fn trigger(&self) -> FlushTrigger {
        self.trigger
    }

    /// `true` when the flush was caused by the pending threshold.
    ///
    /// Observers treat this as "reload everything"; otherwise the batch can
    /// be applied incrementally.
    pub fn is_queue_full(&self) -> bool {
        self.trigger.is_queue_full()
    }

    /// Moved items in arrival order
    pub fn moved(&self) -> &'a [T] {
        self.moved
    }

    pub fn len(&self) -> usize {
        self.moved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }
}

/// Receiver of flush notifications (observer pattern)
pub trait FlushObserver<T>: Send + Sync {
    /// Called synchronously from inside the flush, after pending has been
    /// promoted into main
    fn on_flush(&self, event: &FlushEvent<'_, T>);
}

impl<T, F> FlushObserver<T> for F
where
    F: Fn(&FlushEvent<'_, T>) + Send + Sync,
{
    fn on_flush(&self, event: &FlushEvent<'_, T>) {
        self(event)
    }
}
