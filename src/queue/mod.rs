//! Staged List Queue
//!
//! This module provides a buffering utility for list-backed views: incoming
//! items are staged in a *pending* container and promoted in bulk to a
//! *main* container, either as soon as pending reaches a threshold or
//! whenever a periodic timer fires. A single observer is told about each
//! promotion so it can apply the batch incrementally.
//!
//! # Architecture
//!
//! The queue system consists of several key components:
//!
//! - **IndexedContainer**: ordered storage with checked positional writes
//! - **QueueManager**: owns pending and main, applies the flush policy
//! - **FlushTimer**: cancellable background ticker driving periodic flushes
//! - **FlushObserver**: receiver of [`FlushEvent`]s
//! - **FlushConfig**: threshold, interval and insert position, with presets
//!
//! ```text
//!  append ──► ┌─────────┐  threshold / tick  ┌──────┐
//!             │ pending │ ─────────────────► │ main │
//!             └─────────┘                    └──────┘
//!                               │
//!                               ▼
//!                      observer.on_flush(event)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use listqueue::queue::{ContainerSelect, FlushPreset, QueueManager};
//!
//! let manager = QueueManager::with_config(FlushPreset::Chat.config()).unwrap();
//! manager.append("first");
//! manager.append("second");
//!
//! // The owner normally calls start_periodic_flush(); flush by hand here
//! manager.flush_now();
//! assert_eq!(manager.get_all(ContainerSelect::Main), vec!["second", "first"]);
//! ```

pub mod config;
pub mod container;
pub mod debug;
pub mod error;
pub mod manager;
pub mod observer;
pub mod statistics;
pub mod timer;

// Re-export main types for convenience
pub use config::{load_flush_config, save_flush_config, FlushConfig, FlushPreset};
pub use container::IndexedContainer;
pub use debug::{format_flush_statistics, QueueDebug};
pub use error::{QueueError, QueueResult};
pub use manager::{ContainerSelect, QueueManager};
pub use observer::{FlushEvent, FlushObserver, FlushTrigger};
pub use statistics::FlushStatistics;
pub use timer::FlushTimer;

#[cfg(test)]
mod tests;
