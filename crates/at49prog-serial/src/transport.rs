//! Serial port transport

use crate::error::Result;
use at49prog_core::link::Transport;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Serial port transport
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port at `baud` (8N1, no flow control)
    ///
    /// `timeout` applies to every read; the bridge can stay silent for
    /// minutes while erasing, so keep it long.
    pub fn open(device: &str, baud: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(device, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;

        log::info!("Opened serial port {} at {} baud", device, baud);

        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.port.read_exact(buf)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
