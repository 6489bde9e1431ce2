//! Test module organization for the queue system

pub mod observer;

use crate::queue::{FlushEvent, FlushObserver};
use std::sync::Mutex;

/// A chat-style message used across the queue test suites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub content: String,
}

impl Message {
    pub fn new(id: u32, content: &str) -> Self {
        Self {
            id,
            content: content.to_string(),
        }
    }
}

/// Messages numbered `from..=to` with content "Message N"
pub fn numbered_messages(from: u32, to: u32) -> Vec<Message> {
    (from..=to)
        .map(|id| Message::new(id, &format!("Message {}", id)))
        .collect()
}

/// Observer recording every flush it is told about
pub struct RecordingObserver<T> {
    flushes: Mutex<Vec<(bool, Vec<T>)>>,
}

impl<T: Clone> RecordingObserver<T> {
    pub fn new() -> Self {
        Self {
            flushes: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.flushes.lock().unwrap().len()
    }

    pub fn flushes(&self) -> Vec<(bool, Vec<T>)> {
        self.flushes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(bool, Vec<T>)> {
        self.flushes.lock().unwrap().last().cloned()
    }
}

impl<T> FlushObserver<T> for RecordingObserver<T>
where
    T: Clone + Send,
{
    fn on_flush(&self, event: &FlushEvent<'_, T>) {
        self.flushes
            .lock()
            .unwrap()
            .push((event.is_queue_full(), event.moved().to_vec()));
    }
}
