use clap::Parser;
use rusty_facts::cli::init_logging;
use rusty_facts::cli::run;
use rusty_facts::cli::Args;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("*** Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
