//! Observer contract tests: payload, replacement and re-entrancy

use super::{numbered_messages, Message, RecordingObserver};
use crate::queue::{ContainerSelect, FlushConfig, FlushEvent, FlushTrigger, QueueManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

fn config(threshold: usize, insert_at_top: bool) -> FlushConfig {
    FlushConfig::new(threshold, Duration::from_millis(500), insert_at_top)
}

#[test]
fn test_closure_observer_receives_trigger() {
    let manager = QueueManager::with_config(config(2, false)).unwrap();
    let triggers = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&triggers);
    manager.set_observer(Arc::new(move |event: &FlushEvent<'_, u32>| {
        seen.lock().unwrap().push((event.trigger(), event.len()));
    }));

    manager.append_all(vec![1, 2, 3]);
    manager.flush_now();

    let triggers = triggers.lock().unwrap().clone();
    assert_eq!(
        triggers,
        vec![(FlushTrigger::Threshold, 2), (FlushTrigger::Periodic, 1)]
    );
}

#[test]
fn test_replacing_observer() {
    let manager = QueueManager::with_config(config(1, false)).unwrap();
    let first = Arc::new(RecordingObserver::new());
    let second = Arc::new(RecordingObserver::new());

    manager.set_observer(first.clone());
    manager.append(Message::new(1, "to first"));

    manager.set_observer(second.clone());
    manager.append(Message::new(2, "to second"));

    manager.clear_observer();
    manager.append(Message::new(3, "to nobody"));

    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
    assert_eq!(second.last().unwrap().1[0].id, 2);
    assert_eq!(manager.main_count(), 3);
}

/// Observer that reads main back through the manager, as a list view does
struct ReloadingView {
    manager: Weak<QueueManager<Message>>,
    rows_seen: AtomicUsize,
}

impl crate::queue::FlushObserver<Message> for ReloadingView {
    fn on_flush(&self, event: &FlushEvent<'_, Message>) {
        if let Some(manager) = self.manager.upgrade() {
            if event.is_queue_full() {
                // Full reload: re-sort everything by id
                manager.sort(ContainerSelect::Main, |a, b| a.id.cmp(&b.id));
            }
            self.rows_seen.store(manager.main_count(), Ordering::SeqCst);
        }
    }
}

#[test]
fn test_observer_can_call_back_into_manager() {
    let manager = Arc::new(QueueManager::with_config(config(3, true)).unwrap());
    let view = Arc::new(ReloadingView {
        manager: Arc::downgrade(&manager),
        rows_seen: AtomicUsize::new(0),
    });
    manager.set_observer(view.clone());

    manager.append_all(numbered_messages(1, 3));

    assert_eq!(view.rows_seen.load(Ordering::SeqCst), 3);
    // Threshold flush inserted at the top, then the observer re-sorted
    let ids: Vec<u32> = manager.get_all(ContainerSelect::Main).iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_observer_sees_promoted_state() {
    let manager = Arc::new(QueueManager::with_config(config(10, false)).unwrap());
    let counts = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&manager);
    let seen = Arc::clone(&counts);
    manager.set_observer(Arc::new(move |_event: &FlushEvent<'_, u32>| {
        if let Some(manager) = weak.upgrade() {
            *seen.lock().unwrap() = Some((manager.pending_count(), manager.main_count()));
        }
    }));

    manager.append_all(vec![1, 2]);
    manager.flush_now();

    assert_eq!(*counts.lock().unwrap(), Some((0, 2)));
}
