//! CLI command implementations
//!
//! Every command resolves its address range and reads any payload file
//! before the link is opened, so configuration errors never touch the
//! bridge. The bridge itself is either a serial port or, with
//! `--port dummy`, the in-memory emulator.

pub mod erase;
pub mod hexdump;
mod progress;
pub mod read;
pub mod verify;
pub mod write;

pub use progress::IndicatifProgress;

use at49prog_core::link::Transport;
use at49prog_core::range::{resolve, RangeRequest, ResolvedRange};
use at49prog_core::verify::Verdict;
use at49prog_dummy::EmulatedBridge;
use at49prog_serial::{Bridge, SerialTransport};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Port name that selects the emulator
pub const DUMMY_PORT: &str = "dummy";

/// Boxed error type used by the command layer
pub type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Bridge over whichever transport was selected
pub type DynBridge = Bridge<Box<dyn Transport>>;

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything succeeded
    Success,
    /// Checksums did not match
    VerificationFailed,
}

/// Link settings from the command line
#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub port: String,
    pub baud: u32,
    pub timeout: Duration,
}

/// Open the link and wait for the bridge to report ready
pub fn open_bridge(link: &LinkOptions) -> CmdResult<DynBridge> {
    let transport: Box<dyn Transport> = if link.port == DUMMY_PORT {
        log::info!("Using emulated bridge");
        Box::new(EmulatedBridge::new_default())
    } else {
        log::info!("Setting up serial");
        Box::new(SerialTransport::open(&link.port, link.baud, link.timeout)?)
    };
    Ok(Bridge::connect(transport, link.timeout)?)
}

/// Resolve the address range; warnings are logged by the resolver
fn resolve_range(request: &RangeRequest) -> CmdResult<ResolvedRange> {
    let resolved = resolve(request)?;
    log::debug!("Resolved {} range {}", resolved.mode, resolved.range);
    Ok(resolved)
}

/// Read file contents into a Vec
fn read_file(path: &Path) -> CmdResult<Vec<u8>> {
    let mut file = File::open(path)
        .map_err(|e| format!("Failed to open file {:?}: {}", path, e))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    log::info!("Read {} bytes from {:?}", data.len(), path);
    Ok(data)
}

/// Print a verification verdict
fn report_verdict(verdict: &Verdict) -> Outcome {
    match verdict {
        Verdict::Match(_) => {
            println!("Verification succeeded!");
            Outcome::Success
        }
        Verdict::Mismatch { device, reference } => {
            println!("Expected checksum:\n{}", reference);
            println!("EEPROM checksum:\n{}", device);
            println!("Verification failed!");
            Outcome::VerificationFailed
        }
        Verdict::Unchecked(_) => Outcome::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use at49prog_core::checksum::Digest;

    #[test]
    fn test_verdict_outcome() {
        let a = Digest::of(b"a");
        let b = Digest::of(b"b");
        assert_eq!(report_verdict(&Verdict::Match(a)), Outcome::Success);
        assert_eq!(report_verdict(&Verdict::Unchecked(a)), Outcome::Success);
        assert_eq!(
            report_verdict(&Verdict::Mismatch {
                device: a,
                reference: b
            }),
            Outcome::VerificationFailed
        );
    }

    #[test]
    fn test_open_dummy_bridge() {
        let link = LinkOptions {
            port: DUMMY_PORT.to_string(),
            baud: 115_200,
            timeout: Duration::from_millis(50),
        };
        assert!(open_bridge(&link).is_ok());
    }
}
