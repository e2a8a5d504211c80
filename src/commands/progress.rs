//! Progress reporting with indicatif

use super::hexdump;
use at49prog_core::progress::{Operation, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Create a progress bar with custom phase message
fn create_progress_bar_with_phase(
    total: u64,
    phase: &str,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Progress reporter using indicatif progress bars
///
/// Diagnostic lines from the bridge and, when enabled, hex dump lines go to
/// `out` (stdout by default) with the bar suspended, so they are kept even
/// when the bar is hidden because output is not a terminal.
pub struct IndicatifProgress<W: Write = io::Stdout> {
    bar: Option<ProgressBar>,
    op: Option<Operation>,
    dump: bool,
    out: W,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> IndicatifProgress<W> {
    /// Report dump and diagnostic lines to `out`
    pub fn with_writer(out: W) -> Self {
        Self {
            bar: None,
            op: None,
            dump: false,
            out,
        }
    }

    /// Also print read data as a hex dump
    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.out
    }

    fn println(&mut self, line: String) {
        let out = &mut self.out;
        // Output errors are ignored; the transfer carries on
        let mut emit = || {
            let _ = writeln!(out, "{}", line);
        };
        match &self.bar {
            Some(pb) => pb.suspend(emit),
            None => emit(),
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TransferProgress for IndicatifProgress<W> {
    fn started(&mut self, op: Operation, total: usize) {
        self.op = Some(op);
        let pb = match op {
            Operation::Erase => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message("Erasing chip (this may take a while)...");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            Operation::Read | Operation::Write => {
                create_progress_bar_with_phase(total as u64, &op.to_string())
                    .unwrap_or_else(|_| ProgressBar::new(total as u64))
            }
        };
        self.bar = Some(pb);
    }

    fn advanced(&mut self, done: usize, _total: usize) {
        if let Some(pb) = &self.bar {
            pb.set_position(done as u64);
        }
    }

    fn diagnostic(&mut self, line: &str) {
        self.println(format!("bridge: {}", line));
    }

    fn chunk(&mut self, address: u32, data: &[u8]) {
        if self.dump {
            self.println(hexdump::format_line(address, data));
        }
    }

    fn finished(&mut self) {
        if let Some(pb) = self.bar.take() {
            let message = match self.op {
                Some(Operation::Read) => "Read complete",
                Some(Operation::Write) => "Write complete",
                Some(Operation::Erase) => "Erase complete",
                None => "Done",
            };
            pb.finish_with_message(message);
        }
    }
}
