//! Bridge device implementation
//!
//! [`Bridge`] owns the link for the lifetime of one invocation. It performs
//! the ready handshake, runs single framed exchanges and drives the
//! byte-by-byte streaming transfers on top of them.

use crate::error::{BridgeError, Result};
use at49prog_core::checksum::Digest;
use at49prog_core::link::Transport;
use at49prog_core::progress::{Operation, TransferProgress};
use at49prog_core::protocol::*;
use at49prog_core::range::AddressRange;
use at49prog_core::transfer::TransferState;
use at49prog_core::verify::{self, Verdict};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How often the handshake polls for the ready marker
const READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A connected, ready bridge
pub struct Bridge<T: Transport> {
    /// Transport layer (serial port or emulator)
    transport: T,
}

impl<T: Transport> Bridge<T> {
    /// Wait for the bridge to report ready and take ownership of the link
    ///
    /// Blocks until at least four bytes are waiting, then requires them to
    /// be the ready marker. There is no retry: a wrong marker or no marker
    /// within `timeout` is fatal.
    pub fn connect(transport: T, timeout: Duration) -> Result<Self> {
        let mut bridge = Self { transport };
        bridge.wait_ready(timeout)?;
        Ok(bridge)
    }

    /// Release the link
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send one packet and wait for its result byte
    ///
    /// Diagnostic frames that arrive before the result are forwarded to
    /// `progress`, which is responsible for showing them; they never end
    /// the exchange.
    pub fn exchange<P: TransferProgress>(
        &mut self,
        packet: &Packet,
        progress: &mut P,
    ) -> Result<u8> {
        log::trace!("bridge: -> {:?}", packet);
        self.transport.write(packet.as_bytes())?;
        self.transport.flush()?;
        self.read_result(progress)
    }

    /// Read the range into `sink` and return its checksum
    ///
    /// Every byte is written to the sink and hashed; completed 16-byte
    /// chunks are also handed to `progress` for display. Failures of the
    /// sink itself are reported as [`BridgeError::Sink`], never as link
    /// errors.
    pub fn read_range<W: Write, P: TransferProgress>(
        &mut self,
        range: AddressRange,
        sink: &mut W,
        progress: &mut P,
    ) -> Result<Digest> {
        log::debug!("Reading {} ({} bytes)", range, range.len());
        progress.started(Operation::Read, range.len());

        let mut state = TransferState::new(range);
        while !state.is_complete() {
            let packet = Packet::encode(Command::Read, state.addressing());
            let byte = self.exchange(&packet, progress)?;

            sink.write_all(&[byte]).map_err(BridgeError::Sink)?;
            if let Some(chunk) = state.record(byte) {
                progress.chunk(chunk.address(), chunk.as_slice());
            }
            progress.advanced(state.offset(), state.total());
        }
        sink.flush().map_err(BridgeError::Sink)?;

        progress.finished();
        Ok(state.finish())
    }

    /// Program `payload` into the range and return the checksum of the bytes written
    ///
    /// Only the first `range.len()` bytes of the payload are used. A failure
    /// status stops the transfer at once; bytes already programmed stay
    /// programmed.
    pub fn write_range<P: TransferProgress>(
        &mut self,
        range: AddressRange,
        payload: &[u8],
        progress: &mut P,
    ) -> Result<Digest> {
        if payload.len() < range.len() {
            return Err(BridgeError::InvalidParameter(format!(
                "payload has {} bytes but range {} needs {}",
                payload.len(),
                range,
                range.len()
            )));
        }

        log::debug!("Writing {} ({} bytes)", range, range.len());
        progress.started(Operation::Write, range.len());

        let mut state = TransferState::new(range);
        for &byte in &payload[..range.len()] {
            let address = state.address();
            let packet = Packet::encode(Command::Write(byte), state.addressing());

            match Status::from(self.exchange(&packet, progress)?) {
                Status::Ok => {}
                Status::Failed => {
                    log::error!("Bridge reported write failure at 0x{:04X}", address);
                    return Err(BridgeError::WriteFailed { address });
                }
                Status::Unexpected(status) => {
                    return Err(BridgeError::UnexpectedStatus { address, status });
                }
            }

            state.record(byte);
            progress.advanced(state.offset(), state.total());
        }

        progress.finished();
        Ok(state.finish())
    }

    /// Erase the whole chip
    pub fn erase_chip<P: TransferProgress>(&mut self, progress: &mut P) -> Result<()> {
        log::debug!("Erasing chip");
        progress.started(Operation::Erase, 1);

        let packet = Packet::encode(Command::Erase, Addressing::Repeat);
        match Status::from(self.exchange(&packet, progress)?) {
            Status::Ok => {}
            Status::Failed => return Err(BridgeError::EraseFailed),
            Status::Unexpected(status) => {
                return Err(BridgeError::UnexpectedStatus { address: 0, status });
            }
        }

        progress.advanced(1, 1);
        progress.finished();
        Ok(())
    }

    /// Checksum the range and compare it against an optional reference
    pub fn verify_range<P: TransferProgress>(
        &mut self,
        range: AddressRange,
        reference: Option<&Digest>,
        progress: &mut P,
    ) -> Result<Verdict> {
        let device = self.read_range(range, &mut io::sink(), progress)?;
        Ok(verify::compare(&device, reference))
    }

    // ---- Protocol implementation ----

    /// Wait for the ready marker
    fn wait_ready(&mut self, timeout: Duration) -> Result<()> {
        log::info!("Waiting for bridge...");

        let deadline = Instant::now() + timeout;
        while self.transport.bytes_available()? < READY_MARKER.len() {
            if Instant::now() >= deadline {
                return Err(BridgeError::Timeout);
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }

        let mut got = [0u8; 4];
        self.transport.read(&mut got)?;
        if &got != READY_MARKER {
            return Err(BridgeError::HandshakeFailed { got });
        }

        log::info!("Bridge initialized");
        Ok(())
    }

    /// Read frames until the result frame arrives
    fn read_result<P: TransferProgress>(&mut self, progress: &mut P) -> Result<u8> {
        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; u8::MAX as usize];

        loop {
            // `needed` never overshoots the current frame
            let n = decoder.needed();
            self.transport.read(&mut buf[..n])?;

            for &b in &buf[..n] {
                match decoder.push(b) {
                    Some(Frame::Result(value)) => {
                        log::trace!("bridge: <- 0x{:02X}", value);
                        return Ok(value);
                    }
                    Some(Frame::Diagnostic(line)) => {
                        log::debug!("bridge: {}", line);
                        progress.diagnostic(&line);
                    }
                    None => {}
                }
            }
        }
    }
}
