//! Write command implementation

use super::{
    open_bridge, read_file, report_verdict, resolve_range, CmdResult, IndicatifProgress,
    LinkOptions, Outcome,
};
use crate::cli::RangeArgs;
use at49prog_core::checksum::Digest;
use at49prog_core::range::{Mode, RangeRequest};
use std::path::Path;

/// Run the write command
pub fn run_write(
    link: &LinkOptions,
    range: &RangeArgs,
    input: &Path,
    verify: bool,
) -> CmdResult<Outcome> {
    let payload = read_file(input)?;

    let request = RangeRequest {
        mode: Mode::Write,
        start: range.start,
        end: range.end,
        payload_len: Some(payload.len()),
    };
    let range = resolve_range(&request)?.range;

    // The resolver never lets the range outgrow the payload
    let data = &payload[..range.len()];
    let file_digest = Digest::of(data);
    if payload.len() > data.len() {
        println!("File checksum (first {} bytes) is:\n{}", data.len(), file_digest);
    } else {
        println!("File checksum is:\n{}", file_digest);
    }

    let mut bridge = open_bridge(link)?;

    println!("Writing {} bytes to EEPROM ({})...", range.len(), range);
    bridge.write_range(range, data, &mut IndicatifProgress::new())?;
    println!("Done!");

    if verify {
        println!("Verifying EEPROM...");
        let verdict =
            bridge.verify_range(range, Some(&file_digest), &mut IndicatifProgress::new())?;
        println!("EEPROM checksum:\n{}", verdict.device());
        return Ok(report_verdict(&verdict));
    }

    Ok(Outcome::Success)
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

    #[test]
    fn test_write_and_verify_on_dummy() {
        let path = std::env::temp_dir().join(format!("at49prog-write-{}.bin", std::process::id()));
        std::fs::write(&path, [0x11, 0x22, 0x33, 0x44]).unwrap();

        let args = RangeArgs {
            start: Some(0x0000),
            end: None,
        };
        let outcome = run_write(&dummy_link(), &args, &path, true);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(outcome.unwrap(), Outcome::Success);
    }

    #[test]
    fn test_write_missing_file() {
        let path = Path::new("/nonexistent/at49prog-payload.bin");
        assert!(run_write(&dummy_link(), &RangeArgs::default(), path, false).is_err());
    }
}
