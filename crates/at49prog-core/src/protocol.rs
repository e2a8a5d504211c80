//! Bridge protocol constants and framing
//!
//! Host to bridge, every request is a packet whose first byte is the number
//! of bytes that follow, then an ASCII command letter and its arguments
//! (big-endian):
//!
//! | Command | Initial packet               | Repeat packet       |
//! |---------|------------------------------|---------------------|
//! | Read    | `03 'R' <addr:u16>`          | `01 'R'`            |
//! | Write   | `04 'W' <addr:u16> <data:u8>`| `02 'W' <data:u8>`  |
//! | Erase   | `01 'E'`                     | -                   |
//!
//! The initial packet sets the bridge's address cursor; each repeat packet
//! operates on the next address.
//!
//! Bridge to host, every response is a sequence of length-prefixed frames.
//! A frame of length 1 carries the result byte and ends the exchange. Any
//! other length carries a line of diagnostic text and is followed by more
//! frames.

use core::fmt;
use std::time::Duration;

/// Marker the bridge sends once it has finished initialising
pub const READY_MARKER: &[u8; 4] = b"INIT";

/// Default serial baud rate
pub const DEFAULT_BAUD: u32 = 115_200;

/// Default per-read timeout; chip erase can take a long time
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Read a byte
pub const CMD_READ: u8 = b'R';
/// Program a byte
pub const CMD_WRITE: u8 = b'W';
/// Erase the whole chip
pub const CMD_ERASE: u8 = b'E';

/// Frame length that marks a result frame
pub const RESULT_FRAME_LEN: u8 = 1;

/// Status: operation succeeded
pub const STATUS_OK: u8 = 0x00;
/// Status: operation failed at the current address
pub const STATUS_FAILED: u8 = 0x01;

/// Longest packet the host ever sends
pub const MAX_PACKET_LEN: usize = 5;

/// A single operation requested from the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read the byte at the cursor
    Read,
    /// Program the given byte at the cursor
    Write(u8),
    /// Erase the whole chip
    Erase,
}

impl Command {
    /// The command letter sent on the wire
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Read => CMD_READ,
            Self::Write(_) => CMD_WRITE,
            Self::Erase => CMD_ERASE,
        }
    }
}

/// How a packet positions the bridge's address cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// First packet of a transfer, moves the cursor to the address
    Initial(u16),
    /// Any later packet, the cursor has advanced on its own
    Repeat,
}

/// An encoded host-to-bridge packet
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    buf: [u8; MAX_PACKET_LEN],
    len: usize,
}

impl Packet {
    /// Encode a command
    ///
    /// Erase is single-shot and ignores `addressing`.
    pub fn encode(command: Command, addressing: Addressing) -> Self {
        let mut packet = Self {
            buf: [0; MAX_PACKET_LEN],
            len: 0,
        };
        // Length byte is filled in once the body is complete
        packet.push(0);
        packet.push(command.opcode());

        match (command, addressing) {
            (Command::Erase, _) => {}
            (Command::Read, Addressing::Initial(addr)) => packet.extend(&addr.to_be_bytes()),
            (Command::Read, Addressing::Repeat) => {}
            (Command::Write(data), Addressing::Initial(addr)) => {
                packet.extend(&addr.to_be_bytes());
                packet.push(data);
            }
            (Command::Write(data), Addressing::Repeat) => packet.push(data),
        }

        packet.buf[0] = (packet.len - 1) as u8;
        packet
    }

    /// Raw bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.len] = byte;
        self.len += 1;
    }

    fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet({:02X?})", self.as_bytes())
    }
}

/// One decoded bridge-to-host frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Out-of-band text from the bridge; the exchange continues
    Diagnostic(String),
    /// The result byte; the exchange is complete
    Result(u8),
}

#[derive(Debug)]
enum DecodeState {
    Length,
    Payload { expected: usize },
}

/// Incremental decoder for bridge-to-host frames
///
/// Feed it bytes one at a time with [`push`](Self::push); [`needed`](Self::needed)
/// tells how many bytes complete the current frame, so a blocking reader can
/// fetch them in one go.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    payload: Vec<u8>,
}

impl FrameDecoder {
    /// A decoder waiting for a length byte
    pub fn new() -> Self {
        Self {
            state: DecodeState::Length,
            payload: Vec::new(),
        }
    }

    /// Bytes still missing from the frame being decoded
    pub fn needed(&self) -> usize {
        match self.state {
            DecodeState::Length => 1,
            DecodeState::Payload { expected } => expected - self.payload.len(),
        }
    }

    /// Feed one byte, returning a frame once it is complete
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::Length => {
                if byte == 0 {
                    return Some(Frame::Diagnostic(String::new()));
                }
                self.payload.clear();
                self.state = DecodeState::Payload {
                    expected: byte as usize,
                };
                None
            }
            DecodeState::Payload { expected } => {
                self.payload.push(byte);
                if self.payload.len() < expected {
                    return None;
                }
                self.state = DecodeState::Length;
                if expected == RESULT_FRAME_LEN as usize {
                    Some(Frame::Result(self.payload[0]))
                } else {
                    let text = String::from_utf8_lossy(&self.payload);
                    Some(Frame::Diagnostic(
                        text.trim_end_matches(['\r', '\n']).to_string(),
                    ))
                }
            }
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpretation of a result byte for write and erase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation succeeded
    Ok,
    /// Operation failed at the current address
    Failed,
    /// Any other value, reported verbatim
    Unexpected(u8),
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        match byte {
            STATUS_OK => Self::Ok,
            STATUS_FAILED => Self::Failed,
            other => Self::Unexpected(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| decoder.push(b)).collect()
    }

    #[test]
    fn test_read_packets() {
        let initial = Packet::encode(Command::Read, Addressing::Initial(0xFFF0));
        assert_eq!(initial.as_bytes(), &[0x03, b'R', 0xFF, 0xF0]);
        let repeat = Packet::encode(Command::Read, Addressing::Repeat);
        assert_eq!(repeat.as_bytes(), &[0x01, b'R']);
    }

    #[test]
    fn test_write_packets() {
        let initial = Packet::encode(Command::Write(0x11), Addressing::Initial(0x0102));
        assert_eq!(initial.as_bytes(), &[0x04, b'W', 0x01, 0x02, 0x11]);
        let repeat = Packet::encode(Command::Write(0x22), Addressing::Repeat);
        assert_eq!(repeat.as_bytes(), &[0x02, b'W', 0x22]);
    }

    #[test]
    fn test_erase_packet_ignores_address() {
        let a = Packet::encode(Command::Erase, Addressing::Initial(0x1234));
        let b = Packet::encode(Command::Erase, Addressing::Repeat);
        assert_eq!(a.as_bytes(), &[0x01, b'E']);
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_frame() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.needed(), 1);
        assert_eq!(decoder.push(0x01), None);
        assert_eq!(decoder.needed(), 1);
        assert_eq!(decoder.push(0xAB), Some(Frame::Result(0xAB)));
    }

    #[test]
    fn test_diagnostics_do_not_end_exchange() {
        let mut decoder = FrameDecoder::new();
        let mut wire = Vec::new();
        wire.push(12);
        wire.extend_from_slice(b"Erasing...\r\n");
        wire.push(5);
        wire.extend_from_slice(b"Done\n");
        wire.extend_from_slice(&[0x01, 0x00]);

        let frames = decode_all(&mut decoder, &wire);
        assert_eq!(
            frames,
            vec![
                Frame::Diagnostic("Erasing...".into()),
                Frame::Diagnostic("Done".into()),
                Frame::Result(0x00),
            ]
        );
    }

    #[test]
    fn test_needed_tracks_payload() {
        let mut decoder = FrameDecoder::new();
        decoder.push(4);
        assert_eq!(decoder.needed(), 4);
        decoder.push(b'a');
        decoder.push(b'b');
        assert_eq!(decoder.needed(), 2);
    }

    #[test]
    fn test_empty_diagnostic_frame() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(0), Some(Frame::Diagnostic(String::new())));
        assert_eq!(decoder.needed(), 1);
        assert_eq!(decode_all(&mut decoder, &[1, 7]), vec![Frame::Result(7)]);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::from(0), Status::Ok);
        assert_eq!(Status::from(1), Status::Failed);
        assert_eq!(Status::from(0x42), Status::Unexpected(0x42));
    }
}
