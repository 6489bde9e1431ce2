//! Application initialization and configuration

use anyhow::Result;
use std::path::Path;
use log::{debug, LevelFilter};
use crate::{cli, config, logging};

/// Load the configuration file (explicit or discovered) and overlay the
/// command line on top of it
pub fn load_configuration(args: &cli::Args) -> Result<config::AppConfig> {
    let mut app_config = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::AppConfig::load_from_file(config_file)?
    } else {
        config::AppConfig::load()?
    };

    cli::apply_args(args, &mut app_config)?;
    Ok(app_config)
}

/// Handle configuration export command
pub fn handle_export_config(app_config: &config::AppConfig, export_path: &Path) -> Result<()> {
    app_config.export(export_path)?;
    println!("Configuration exported to: {}", export_path.display());
    Ok(())
}

/// Build the logger configuration from the effective settings.
///
/// A log file without an explicit file level logs at the console level.
pub fn configure_logging(app_config: &config::AppConfig) -> Result<logging::LogConfig> {
    let settings = &app_config.logging;
    let console_level = settings.console_level()?;
    let file_level = settings.file_level()?;

    let (destination, file_level) = match (&settings.file, file_level) {
        (Some(file_path), Some(level)) => {
            debug!("File logging enabled: {} (level: {:?})", file_path.display(), level);
            (logging::LogDestination::for_file(Some(file_path.clone())), Some(level))
        }
        (Some(file_path), None) => {
            debug!("File logging enabled: {} (level: {:?} - same as console)", file_path.display(), console_level);
            (logging::LogDestination::for_file(Some(file_path.clone())), Some(console_level))
        }
        (None, _) => (logging::LogDestination::Console, None::<LevelFilter>),
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format: settings.format,
        destination,
    })
}
