//! # Cheesebot
//!
//! Runs the bot with the local sound card as its voice channel and the
//! terminal as its text channel.

use clap::Parser;
use log::error;

mod cli;
mod local;
mod logging;
mod runner;

fn main() {
    dotenv::dotenv().ok();
    let args = cli::Cli::parse();
    let log_buffer = logging::init(args.debug);

    // For any error, return an exit code -1. Otherwise return the exit code provided.
    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
