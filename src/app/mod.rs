//! Application orchestration module

pub mod execution;
pub mod feed;
pub mod initialization;

pub use execution::{run_feed, FeedSummary};
pub use feed::{shuffle_seeded, Comment, CommentSource, FeedView, ViewStats, ViewUpdate};
pub use initialization::{configure_logging, handle_export_config, load_configuration};
