//! at49prog - Programmer for AT49F512 parallel EEPROMs behind a serial bridge
//!
//! A microcontroller drives the chip's parallel bus and is reached over a
//! serial link. This tool reads, writes, verifies and erases the chip
//! through it, one framed exchange per byte.
//!
//! # Architecture
//!
//! - `at49prog-core` - address range resolution, protocol framing, checksums
//! - `at49prog-serial` - the serial link and the streaming transfer engine
//! - `at49prog-dummy` - an emulated bridge, selected with `--port dummy`
//!
//! This binary only parses arguments, reads and writes payload files and
//! renders progress.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{LinkOptions, Outcome};
use std::time::Duration;

/// Exit status for a completed run whose checksums did not match
const EXIT_VERIFY_FAILED: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let link = LinkOptions {
        port: cli.port,
        baud: cli.baud,
        timeout: Duration::from_secs(cli.timeout),
    };

    let outcome = match cli.command {
        Commands::Read {
            range,
            output,
            verify,
            no_dump,
        } => commands::read::run_read(&link, &range, output.as_deref(), verify, !no_dump),
        Commands::Write {
            range,
            input,
            verify,
        } => commands::write::run_write(&link, &range, &input, verify),
        Commands::Verify {
            range,
            input,
            sha256,
        } => commands::verify::run_verify(&link, &range, input.as_deref(), sha256.as_deref()),
        Commands::Erase { range } => commands::erase::run_erase(&link, &range),
    }?;

    if outcome == Outcome::VerificationFailed {
        std::process::exit(EXIT_VERIFY_FAILED);
    }

    Ok(())
}
