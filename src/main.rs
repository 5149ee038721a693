//! model-import - bulk-import XML or JSON records into models.

use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use model_importer::cli::{self, Cli};
use model_importer::core::import::ImportStatus;
use model_importer::core::report::{ConsoleReporter, ImportReporter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli::run(&cli) {
        Ok(execution) => match execution.status {
            ImportStatus::Completed => ExitCode::SUCCESS,
            ImportStatus::Stopped => ExitCode::FAILURE,
        },
        Err(e) => {
            if let Some(detail) = e.detail() {
                error!("{}", detail);
            }
            ConsoleReporter::stdio().fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("model_importer", level)
        .parse_default_env()
        .init();
}
