//! Verify command implementation

use super::{
    open_bridge, read_file, report_verdict, resolve_range, CmdResult, IndicatifProgress,
    LinkOptions, Outcome,
};
use crate::cli::RangeArgs;
use at49prog_core::checksum::Digest;
use at49prog_core::range::{Mode, RangeRequest};
use std::path::Path;

/// Run the verify command
///
/// The reference is a file, a hex digest or nothing; with no reference the
/// device checksum is only printed.
pub fn run_verify(
    link: &LinkOptions,
    range: &RangeArgs,
    input: Option<&Path>,
    sha256: Option<&str>,
) -> CmdResult<Outcome> {
    let mut payload_len = None;
    let reference = match (input, sha256) {
        (Some(path), _) => {
            let data = read_file(path)?;
            payload_len = Some(data.len());
            Some(Digest::of(&data))
        }
        (None, Some(hex)) => Some(hex.parse::<Digest>()?),
        (None, None) => None,
    };

    let request = RangeRequest {
        mode: Mode::Verify,
        start: range.start,
        end: range.end,
        payload_len,
    };
    let range = resolve_range(&request)?.range;

    let mut bridge = open_bridge(link)?;

    println!("Verifying {} bytes ({})", range.len(), range);
    let verdict = bridge.verify_range(range, reference.as_ref(), &mut IndicatifProgress::new())?;
    println!("SHA256: {}", verdict.device());

    Ok(report_verdict(&verdict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DUMMY_PORT;
    use std::time::Duration;

    fn dummy_link() -> LinkOptions {
        LinkOptions {
            port: DUMMY_PORT.to_string(),
            baud: 115_200,
            timeout: Duration::from_millis(50),
        }
    }

    fn range(start: u32, end: u32) -> RangeArgs {
        RangeArgs {
            start: Some(start),
            end: Some(end),
        }
    }

    #[test]
    fn test_verify_against_digest() {
        // The emulator starts out erased
        let erased = Digest::of(&[0xFF; 0x100]).to_string();
        let outcome = run_verify(&dummy_link(), &range(0, 0x100), None, Some(&erased)).unwrap();
        assert_eq!(outcome, Outcome::Success);
    }

    #[test]
    fn test_verify_mismatch_is_not_an_error() {
        let other = Digest::of(b"not erased").to_string();
        let outcome = run_verify(&dummy_link(), &range(0, 0x100), None, Some(&other)).unwrap();
        assert_eq!(outcome, Outcome::VerificationFailed);
    }

    #[test]
    fn test_verify_rejects_bad_digest() {
        assert!(run_verify(&dummy_link(), &range(0, 0x10), None, Some("xyz")).is_err());
    }
}
