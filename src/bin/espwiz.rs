use std::process::ExitCode;

use clap::Parser;
use espwiz::{cli, logging::initialize_logger, Config};
use log::{debug, warn, LevelFilter};
use miette::Report;

/// Interactive wizard for flashing ESP8266 firmware with esptool.
#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {}

fn main() -> ExitCode {
    miette::set_panic_hook();
    initialize_logger(LevelFilter::Info);

    // No arguments beyond the derived --help/--version; the workflow itself
    // is fully interactive.
    let _cli = Cli::parse();

    // A terminal interrupt during any blocking wait ends the whole program
    // with the conventional interrupt status.
    if let Err(err) = ctrlc::set_handler(|| std::process::exit(130)) {
        warn!("failed to install interrupt handler: {err}");
    }

    let config = Config::load();
    debug!("{config:?}");

    let code = match cli::run(&config) {
        Ok(()) => 0,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", Report::new(err));
            code
        }
    };

    cli::pause_before_exit();
    ExitCode::from(code)
}
