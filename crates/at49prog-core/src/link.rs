//! Byte transport abstraction
//!
//! The transfer engine only needs to write bytes, read an exact number of
//! bytes and ask how many bytes are waiting. Serial ports, the emulator and
//! test doubles all implement [`Transport`].

use std::io;

/// A blocking, byte-oriented duplex link to the bridge
pub trait Transport {
    /// Write all bytes to the link
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read exactly `buf.len()` bytes
    ///
    /// Blocks until the bytes arrive or the link's read timeout expires, in
    /// which case an error of kind [`io::ErrorKind::TimedOut`] is returned.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Flush any buffered output
    fn flush(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read(buf)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
