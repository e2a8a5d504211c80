//! Read command implementation

use super::{
    open_bridge, report_verdict, resolve_range, CmdResult, IndicatifProgress, LinkOptions, Outcome,
};
use crate::cli::RangeArgs;
use at49prog_core::range::{Mode, RangeRequest};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Run the read command
///
/// Without an output file the data is shown as a hex dump (unless `dump`
/// is off). With `verify` the range is read a second time and the two
/// checksums are compared.
pub fn run_read(
    link: &LinkOptions,
    range: &RangeArgs,
    output: Option<&Path>,
    verify: bool,
    dump: bool,
) -> CmdResult<Outcome> {
    let request = RangeRequest {
        mode: Mode::Read,
        start: range.start,
        end: range.end,
        payload_len: None,
    };
    let range = resolve_range(&request)?.range;

    let mut bridge = open_bridge(link)?;

    // Only touch the output file once the bridge has answered
    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            format!("Failed to open file {:?}: {}", path, e)
        })?)),
        None => Box::new(io::sink()),
    };

    println!("Reading {} bytes ({})", range.len(), range);
    let mut progress = IndicatifProgress::new().with_dump(dump && output.is_none());
    let digest = bridge.read_range(range, &mut sink, &mut progress)?;
    drop(sink);

    if let Some(path) = output {
        println!("Wrote {} bytes to {:?}", range.len(), path);
    }
    println!("SHA256: {}", digest);

    if verify {
        println!("Verifying EEPROM...");
        let verdict = bridge.verify_range(range, Some(&digest), &mut IndicatifProgress::new())?;
        return Ok(report_verdict(&verdict));
    }

    Ok(Outcome::Success)
}
