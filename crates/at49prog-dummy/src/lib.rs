//! at49prog-dummy - In-memory bridge emulator for testing
//!
//! This crate provides a [`Transport`] that behaves like the microcontroller
//! bridge with an AT49F512 attached. It speaks the real wire protocol, so
//! everything above the transport runs unchanged without hardware.

use at49prog_core::link::Transport;
use at49prog_core::protocol::{
    CMD_ERASE, CMD_READ, CMD_WRITE, READY_MARKER, RESULT_FRAME_LEN, STATUS_FAILED, STATUS_OK,
};
use at49prog_core::range::CHIP_SIZE;
use std::collections::VecDeque;
use std::io;

/// Status the emulator answers unknown packets with
pub const STATUS_UNKNOWN_COMMAND: u8 = 0xFF;

/// Configuration for the emulated bridge
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    /// Marker sent once the bridge is "initialised"
    pub ready_marker: [u8; 4],
    /// Report a write failure when programming this address
    pub fail_write_at: Option<u32>,
    /// Send diagnostic lines around a chip erase
    pub erase_diagnostics: bool,
    /// Report a failed chip erase and leave the contents untouched
    pub fail_erase: bool,
    /// Programming can only clear bits, as on the real part
    pub strict_program: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            ready_marker: *READY_MARKER,
            fail_write_at: None,
            erase_diagnostics: true,
            fail_erase: false,
            strict_program: true,
        }
    }
}

/// Emulated bridge and chip
pub struct EmulatedBridge {
    config: EmulatorConfig,
    data: Vec<u8>,
    cursor: u16,
    rx: Vec<u8>,
    tx: VecDeque<u8>,
    packets: usize,
}

impl EmulatedBridge {
    /// Create an emulator with an erased chip
    pub fn new(config: EmulatorConfig) -> Self {
        let tx = config.ready_marker.iter().copied().collect();
        Self {
            config,
            data: vec![0xFF; CHIP_SIZE as usize],
            cursor: 0,
            rx: Vec::new(),
            tx,
            packets: 0,
        }
    }

    /// Create an emulator with default configuration
    pub fn new_default() -> Self {
        Self::new(EmulatorConfig::default())
    }

    /// Create an emulator with pre-filled chip contents starting at address 0
    pub fn with_data(config: EmulatorConfig, initial_data: &[u8]) -> Self {
        let mut bridge = Self::new(config);
        let len = core::cmp::min(initial_data.len(), bridge.data.len());
        bridge.data[..len].copy_from_slice(&initial_data[..len]);
        bridge
    }

    /// Get a reference to the chip contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of complete packets processed
    pub fn packets_received(&self) -> usize {
        self.packets
    }

    fn respond(&mut self, value: u8) {
        self.tx.push_back(RESULT_FRAME_LEN);
        self.tx.push_back(value);
    }

    fn diagnostic(&mut self, text: &str) {
        let mut line = text.as_bytes().to_vec();
        line.push(b'\n');
        line.truncate(u8::MAX as usize);
        // A one byte payload would read as a result frame
        if line.len() == RESULT_FRAME_LEN as usize {
            line.insert(0, b' ');
        }
        self.tx.push_back(line.len() as u8);
        self.tx.extend(line);
    }

    fn handle_packet(&mut self, body: &[u8]) {
        self.packets += 1;
        log::trace!("dummy: packet {:02X?}", body);

        match (body[0], body.len()) {
            (CMD_READ, 3) => {
                self.cursor = u16::from_be_bytes([body[1], body[2]]);
                self.handle_read();
            }
            (CMD_READ, 1) => self.handle_read(),
            (CMD_WRITE, 4) => {
                self.cursor = u16::from_be_bytes([body[1], body[2]]);
                self.handle_program(body[3]);
            }
            (CMD_WRITE, 2) => self.handle_program(body[1]),
            (CMD_ERASE, 1) => self.handle_chip_erase(),
            _ => {
                self.diagnostic("Unknown command");
                self.respond(STATUS_UNKNOWN_COMMAND);
            }
        }
    }

    fn handle_read(&mut self) {
        let value = self.data[self.cursor as usize];
        self.cursor = self.cursor.wrapping_add(1);
        self.respond(value);
    }

    fn handle_program(&mut self, byte: u8) {
        let addr = self.cursor as usize;

        if self.config.fail_write_at == Some(addr as u32) {
            self.respond(STATUS_FAILED);
            return;
        }

        // Programming can only change 1 -> 0
        let current = self.data[addr];
        if self.config.strict_program && current & byte != byte {
            self.respond(STATUS_FAILED);
            return;
        }

        self.data[addr] = if self.config.strict_program {
            current & byte
        } else {
            byte
        };
        self.cursor = self.cursor.wrapping_add(1);
        self.respond(STATUS_OK);
    }

    fn handle_chip_erase(&mut self) {
        if self.config.erase_diagnostics {
            self.diagnostic("Erasing chip...");
        }
        if self.config.fail_erase {
            self.diagnostic("Erase timed out");
            self.respond(STATUS_FAILED);
            return;
        }
        for byte in &mut self.data {
            *byte = 0xFF;
        }
        if self.config.erase_diagnostics {
            self.diagnostic("Erase complete");
        }
        self.respond(STATUS_OK);
    }
}

impl Transport for EmulatedBridge {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        for &b in data {
            self.rx.push(b);
            let expected = self.rx[0] as usize + 1;
            if self.rx.len() == expected {
                let packet = std::mem::take(&mut self.rx);
                if packet.len() > 1 {
                    self.handle_packet(&packet[1..]);
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if self.tx.len() < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "emulated bridge has nothing to send",
            ));
        }
        let n = buf.len();
        for (dst, src) in buf.iter_mut().zip(self.tx.drain(..n)) {
            *dst = src;
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.tx.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(bridge: &mut EmulatedBridge) {
        let mut marker = [0u8; 4];
        bridge.read(&mut marker).unwrap();
        assert_eq!(&marker, READY_MARKER);
    }

    fn response(bridge: &mut EmulatedBridge) -> Vec<u8> {
        let n = bridge.bytes_available().unwrap();
        let mut buf = vec![0u8; n];
        bridge.read(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_ready_marker() {
        let mut bridge = EmulatedBridge::new_default();
        assert_eq!(bridge.bytes_available().unwrap(), 4);
        ready(&mut bridge);
        assert_eq!(bridge.bytes_available().unwrap(), 0);
    }

    #[test]
    fn test_read_advances_cursor() {
        let mut bridge = EmulatedBridge::with_data(EmulatorConfig::default(), &[0x10, 0x20, 0x30]);
        ready(&mut bridge);
        bridge.write(&[0x03, b'R', 0x00, 0x01]).unwrap();
        assert_eq!(response(&mut bridge), vec![0x01, 0x20]);
        bridge.write(&[0x01, b'R']).unwrap();
        assert_eq!(response(&mut bridge), vec![0x01, 0x30]);
    }

    #[test]
    fn test_packet_split_across_writes() {
        let mut bridge = EmulatedBridge::new_default();
        ready(&mut bridge);
        bridge.write(&[0x04, b'W']).unwrap();
        assert_eq!(bridge.packets_received(), 0);
        bridge.write(&[0x12, 0x34, 0x00]).unwrap();
        assert_eq!(bridge.packets_received(), 1);
        assert_eq!(response(&mut bridge), vec![0x01, STATUS_OK]);
        assert_eq!(bridge.data()[0x1234], 0x00);
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut bridge = EmulatedBridge::new_default();
        ready(&mut bridge);
        bridge.write(&[0x04, b'W', 0x00, 0x00, 0x0F]).unwrap();
        assert_eq!(response(&mut bridge), vec![0x01, STATUS_OK]);
        bridge.write(&[0x04, b'W', 0x00, 0x00, 0xF0]).unwrap();
        assert_eq!(response(&mut bridge), vec![0x01, STATUS_FAILED]);
        assert_eq!(bridge.data()[0], 0x0F);
    }

    #[test]
    fn test_erase_sends_diagnostics_first() {
        let mut bridge = EmulatedBridge::with_data(EmulatorConfig::default(), &[0u8; 16]);
        ready(&mut bridge);
        bridge.write(&[0x01, b'E']).unwrap();
        let bytes = response(&mut bridge);
        assert_eq!(bytes[0] as usize, "Erasing chip...\n".len());
        assert_eq!(&bytes[bytes.len() - 2..], &[0x01, STATUS_OK]);
        assert!(bridge.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_erase_failure_injection() {
        let config = EmulatorConfig {
            fail_erase: true,
            ..EmulatorConfig::default()
        };
        let mut bridge = EmulatedBridge::with_data(config, &[0u8; 16]);
        ready(&mut bridge);
        bridge.write(&[0x01, b'E']).unwrap();
        let bytes = response(&mut bridge);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x01, STATUS_FAILED]);
        assert!(bridge.data()[..16].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_read_fills_whole_buffer_in_order() {
        let mut bridge = EmulatedBridge::with_data(EmulatorConfig::default(), &[0xA1, 0xB2]);
        ready(&mut bridge);
        bridge.write(&[0x03, b'R', 0x00, 0x00]).unwrap();
        bridge.write(&[0x01, b'R']).unwrap();
        let mut buf = [0u8; 4];
        bridge.read(&mut buf).unwrap();
        assert_eq!(buf, [0x01, 0xA1, 0x01, 0xB2]);
        assert_eq!(bridge.bytes_available().unwrap(), 0);
    }

    #[test]
    fn test_unknown_command() {
        let mut bridge = EmulatedBridge::new_default();
        ready(&mut bridge);
        bridge.write(&[0x01, b'Z']).unwrap();
        let bytes = response(&mut bridge);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x01, STATUS_UNKNOWN_COMMAND]);
    }

    #[test]
    fn test_read_with_nothing_pending_times_out() {
        let mut bridge = EmulatedBridge::new_default();
        ready(&mut bridge);
        let err = bridge.read(&mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
