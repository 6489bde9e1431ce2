use anyhow::Result;
use std::process;
use log::error;
use listqueue::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();
    cli::validate_args(&args)?;

    let app_config = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&app_config)?;
    logging::init_logger(log_config)?;

    if let Some(export_path) = &args.export_config {
        return app::handle_export_config(&app_config, export_path);
    }

    let summary = app::run_feed(&app_config)?;
    println!("{}", summary.report());

    Ok(())
}
