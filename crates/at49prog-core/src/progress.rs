//! Progress and diagnostic reporting
//!
//! The transfer engine reports through a [`TransferProgress`] observer. It
//! carries no protocol meaning; front ends turn it into progress bars, hex
//! dumps or log lines.

use core::fmt;

/// Kind of transfer being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading bytes from the chip
    Read,
    /// Programming bytes into the chip
    Write,
    /// Erasing the whole chip
    Erase,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "Reading",
            Self::Write => "Writing",
            Self::Erase => "Erasing",
        };
        f.write_str(name)
    }
}

/// Callback for progress reporting during transfers
pub trait TransferProgress {
    /// Called once before the first exchange
    fn started(&mut self, op: Operation, total: usize);

    /// Called after each byte; `done` counts completed bytes
    fn advanced(&mut self, done: usize, total: usize);

    /// Called for every line of diagnostic text the bridge sends
    fn diagnostic(&mut self, line: &str);

    /// Called with consecutive blocks of read data for display
    ///
    /// Blocks are [`CHUNK_SIZE`](crate::transfer::CHUNK_SIZE) bytes long,
    /// except the last one of a range which may be shorter.
    fn chunk(&mut self, _address: u32, _data: &[u8]) {}

    /// Called once after the last exchange succeeded
    fn finished(&mut self);
}

/// A no-op progress reporter
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn started(&mut self, _op: Operation, _total: usize) {}
    fn advanced(&mut self, _done: usize, _total: usize) {}
    fn diagnostic(&mut self, _line: &str) {}
    fn finished(&mut self) {}
}

impl<P: TransferProgress + ?Sized> TransferProgress for &mut P {
    fn started(&mut self, op: Operation, total: usize) {
        (**self).started(op, total)
    }

    fn advanced(&mut self, done: usize, total: usize) {
        (**self).advanced(done, total)
    }

    fn diagnostic(&mut self, line: &str) {
        (**self).diagnostic(line)
    }

    fn chunk(&mut self, address: u32, data: &[u8]) {
        (**self).chunk(address, data)
    }

    fn finished(&mut self) {
        (**self).finished()
    }
}
