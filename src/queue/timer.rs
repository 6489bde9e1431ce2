//! Periodic Flush Timer
//!
//! Owns the background thread that drives periodic flushes. The thread waits
//! on a `crossbeam_channel` ticker and a stop channel; stopping the timer
//! signals the thread and joins it, so no tick runs after `stop` returns.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crossbeam_channel::{self, select, Receiver, Sender};

/// Name given to timer threads
pub const TIMER_THREAD_NAME: &str = "listqueue-flush";

/// Handle to a running periodic timer
///
/// The tick callback receives the timer's `active` flag so that a tick which
/// has to wait for a lock can give up once the timer is being stopped. The
/// callback returns `false` to end the timer from the inside.
pub struct FlushTimer {
    interval: Duration,
    active: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    stop_sender: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    /// Spawn the timer thread
    pub fn start<F>(interval: Duration, tick: F) -> io::Result<Self>
    where
        F: FnMut(&AtomicBool) -> bool + Send + 'static,
    {
        let (stop_sender, stop_receiver) = crossbeam_channel::bounded(1);
        let active = Arc::new(AtomicBool::new(true));
        let ticks = Arc::new(AtomicU64::new(0));

        let thread_active = Arc::clone(&active);
        let thread_ticks = Arc::clone(&ticks);
        let handle = thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_string())
            .spawn(move || {
                Self::timer_loop(interval, stop_receiver, thread_active, thread_ticks, tick);
            })?;

        Ok(Self {
            interval,
            active,
            ticks,
            stop_sender: Some(stop_sender),
            thread_handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the timer thread is still ticking
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Number of ticks delivered so far
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stop the timer and wait for the thread to exit.
    ///
    /// A tick already in progress is allowed to finish. When called from the
    /// timer thread itself (from inside a tick) the thread is signalled but
    /// not joined; it exits before its next tick.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);

        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.try_send(());
        }

        if let Some(handle) = self.thread_handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                crate::queue_error!("Flush timer thread panicked");
            }
        }
    }

    fn timer_loop<F>(
        interval: Duration,
        stop_receiver: Receiver<()>,
        active: Arc<AtomicBool>,
        ticks: Arc<AtomicU64>,
        mut tick: F,
    ) where
        F: FnMut(&AtomicBool) -> bool,
    {
        let ticker = crossbeam_channel::tick(interval);

        loop {
            select! {
                recv(stop_receiver) -> _ => break,
                recv(ticker) -> _ => {
                    if !active.load(Ordering::Acquire) {
                        break;
                    }
                    ticks.fetch_add(1, Ordering::Relaxed);
                    if !tick(&active) {
                        break;
                    }
                }
            }
        }

        active.store(false, Ordering::Release);
        crate::queue_debug!("Flush timer thread exiting after {} ticks", ticks.load(Ordering::Relaxed));
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for FlushTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushTimer")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .field("ticks", &self.tick_count())
            .finish()
    }
}
