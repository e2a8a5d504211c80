//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a hexadecimal address, with or without a `0x` prefix
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex address: {}", e))
}

#[derive(Parser)]
#[command(name = "at49prog")]
#[command(author, version, about = "Serial bridge programmer for AT49F512 EEPROMs", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Serial device of the bridge, or "dummy" for the built-in emulator
    #[arg(short, long, global = true, default_value = "/dev/ttyACM0")]
    pub port: String,

    /// Serial baud rate
    #[arg(long, global = true, default_value_t = 115_200)]
    pub baud: u32,

    /// Per-read timeout in seconds (chip erase can be slow)
    #[arg(long, global = true, default_value_t = 600)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

/// Address bounds shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start address (hex, e.g. 0x0C00)
    #[arg(long, value_parser = parse_hex_u32)]
    pub start: Option<u32>,

    /// End address, exclusive (hex, e.g. 0x0E00)
    #[arg(long, value_parser = parse_hex_u32)]
    pub end: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read chip contents to a file or as a hex dump
    Read {
        #[command(flatten)]
        range: RangeArgs,

        /// Output file path (hex dump to stdout if not given)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read the range a second time and compare checksums
        #[arg(long)]
        verify: bool,

        /// Don't print a hex dump, only the checksum
        #[arg(long)]
        no_dump: bool,
    },

    /// Write a file to the chip
    Write {
        #[command(flatten)]
        range: RangeArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Read back and compare checksums after writing
        #[arg(long)]
        verify: bool,
    },

    /// Checksum chip contents, optionally against a file or digest
    Verify {
        #[command(flatten)]
        range: RangeArgs,

        /// Reference file to compare against
        #[arg(short, long, conflicts_with = "sha256")]
        input: Option<PathBuf>,

        /// Reference SHA-256 digest (64 hex digits)
        #[arg(long)]
        sha256: Option<String>,
    },

    /// Erase the whole chip
    Erase {
        // Accepted only to be rejected: the chip is erased as a whole
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_u32("0x0C00"), Ok(0x0C00));
        assert_eq!(parse_hex_u32("0Xff"), Ok(0xFF));
        assert_eq!(parse_hex_u32("10000"), Ok(0x10000));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("").is_err());
    }

    #[test]
    fn test_cli_parses_write() {
        let cli = Cli::try_parse_from([
            "at49prog", "--port", "dummy", "write", "--start", "0x100", "-i", "rom.bin", "--verify",
        ])
        .unwrap();
        assert_eq!(cli.port, "dummy");
        match cli.command {
            Commands::Write {
                range,
                input,
                verify,
            } => {
                assert_eq!(range.start, Some(0x100));
                assert_eq!(range.end, None);
                assert_eq!(input, PathBuf::from("rom.bin"));
                assert!(verify);
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_verify_reference_conflict() {
        let res = Cli::try_parse_from([
            "at49prog", "verify", "-i", "a.bin", "--sha256", "00",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
