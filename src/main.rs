use std::process::ExitCode;

use emlgen::{Outcome, usage};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // Log level comes from RUST_LOG so the command-line grammar stays fixed.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    match emlgen::run(std::env::args_os().skip(1)) {
        Ok(Outcome::Help(reason)) => {
            println!("{}", usage::render(&reason));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Invalid(violations)) => {
            for violation in violations {
                println!("{}", violation);
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Written { dir, path }) => {
            println!();
            println!(".eml file written to {}.", dir.display());
            println!("{}", path.display());
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Error messages already carry their underlying cause.
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
