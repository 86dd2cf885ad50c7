//! Provides the main entry point to the program.
use human_panic::setup_panic;
use std::process::ExitCode;

fn main() -> ExitCode {
    setup_panic!();

    if let Err(err) = housing_abm::cli::run_cli() {
        eprintln!("Error: {err:?}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
