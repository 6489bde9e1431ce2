use clap::Parser;
use anyhow::{Context, Result};
use std::path::PathBuf;
use log::{debug, info};
use crate::config::AppConfig;
use crate::queue::FlushPreset;

/// Staged list queue feed simulator
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "listqueue")]
#[command(about = "Feeds a stream of comments through a staged list queue and reports how the view was updated")]
#[command(version)]
pub struct Args {
    /// Named flush preset: chat, balanced, burst or realtime
    #[arg(short, long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Pending size that forces an immediate flush
    #[arg(short, long, value_name = "N")]
    pub threshold: Option<usize>,

    /// Periodic flush interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Promote new items into the top of the list
    #[arg(long)]
    pub insert_at_top: bool,

    /// Number of comments to produce
    #[arg(short, long, value_name = "N")]
    pub messages: Option<usize>,

    /// Produce comments in shuffled batches
    #[arg(short, long)]
    pub bulk: bool,

    /// Delay between produced comments or batches in milliseconds
    #[arg(long, value_name = "MS")]
    pub produce_interval_ms: Option<u64>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub export_config: Option<PathBuf>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    if let Some(format) = &args.log_format {
        format
            .parse::<crate::logging::LogFormat>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    if let Some(level) = &args.log_file_level {
        crate::logging::parse_log_level(level)?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file to be specified"));
    }

    if let Some(preset) = &args.preset {
        preset.parse::<FlushPreset>().map_err(|e| anyhow::anyhow!(e))?;
    }

    if args.threshold == Some(0) {
        return Err(anyhow::anyhow!("--threshold must be at least 1"));
    }

    if args.interval_ms == Some(0) {
        return Err(anyhow::anyhow!("--interval-ms must be at least 1"));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}

/// Overlay command line settings onto a loaded configuration.
///
/// A preset replaces the `[queue]` table first; explicit queue flags then
/// override individual preset values.
pub fn apply_args(args: &Args, config: &mut AppConfig) -> Result<()> {
    if let Some(preset) = &args.preset {
        let preset: FlushPreset = preset.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        debug!("Applying flush preset {:?}", preset);
        config.queue = preset.config();
    }

    if let Some(threshold) = args.threshold {
        config.queue.queue_threshold = threshold;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.queue.flush_interval_ms = interval_ms;
    }
    if args.insert_at_top {
        config.queue.insert_at_top = true;
    }

    if let Some(messages) = args.messages {
        config.feed.messages = messages;
    }
    if args.bulk {
        config.feed.bulk = true;
    }
    if let Some(produce_interval_ms) = args.produce_interval_ms {
        config.feed.produce_interval_ms = produce_interval_ms;
    }

    if let Some(format) = &args.log_format {
        config.logging.format = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(path) = &args.log_file {
        config.logging.file = Some(path.clone());
    }
    if let Some(level) = &args.log_file_level {
        config.logging.file_level = Some(level.clone());
    }

    let console_level = if args.debug {
        Some("trace")
    } else if args.verbose {
        Some("debug")
    } else if args.quiet {
        Some("error")
    } else {
        None
    };
    if let Some(level) = console_level {
        config.logging.level = level.to_string();
    }

    config.validate().context("Invalid configuration after applying command line options")
}
