//! Error types for bridge operations

use thiserror::Error;

/// Link and device errors
///
/// Every variant is fatal for the current transfer; nothing is retried.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge did not announce itself with the ready marker
    #[error("Unexpected response from bridge: {got:02X?} (expected \"INIT\")")]
    HandshakeFailed {
        /// The bytes received instead of the marker
        got: [u8; 4],
    },

    /// A read did not complete within the link timeout
    #[error("Communication timeout")]
    Timeout,

    /// The link closed underneath us
    #[error("Bridge disconnected")]
    Disconnected,

    /// Other I/O error during communication
    #[error("I/O error: {0}")]
    Io(String),

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The bridge reported a failed write
    #[error("Failed to write byte at address 0x{address:04X}")]
    WriteFailed {
        /// Address of the byte that was not programmed
        address: u32,
    },

    /// The bridge reported a failed chip erase
    #[error("Chip erase failed")]
    EraseFailed,

    /// The bridge answered with a status outside the defined set
    #[error("Unexpected status 0x{status:02X} at address 0x{address:04X}")]
    UnexpectedStatus {
        /// Address the exchange targeted
        address: u32,
        /// The raw status byte
        status: u8,
    },

    /// The host-side output for read data failed
    #[error("Failed to write read data: {0}")]
    Sink(#[source] std::io::Error),

    /// The engine was called with inconsistent arguments
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for bridge operations
pub type Result<T> = core::result::Result<T, BridgeError>;

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => BridgeError::Timeout,
            ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
                BridgeError::Disconnected
            }
            _ => BridgeError::Io(e.to_string()),
        }
    }
}

impl BridgeError {
    /// Whether the error came from the link rather than the chip
    pub fn is_link_error(&self) -> bool {
        matches!(
            self,
            Self::HandshakeFailed { .. }
                | Self::Timeout
                | Self::Disconnected
                | Self::Io(_)
                | Self::Serial(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_mapping() {
        let timeout = io::Error::new(io::ErrorKind::TimedOut, "t");
        assert!(matches!(BridgeError::from(timeout), BridgeError::Timeout));
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(BridgeError::from(eof), BridgeError::Disconnected));
        let other = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(BridgeError::from(other), BridgeError::Io(_)));
    }

    #[test]
    fn test_sink_error_is_not_a_link_error() {
        let e = BridgeError::Sink(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(!e.is_link_error());
        assert!(e.to_string().starts_with("Failed to write read data"));
    }

    #[test]
    fn test_write_failure_message() {
        let e = BridgeError::WriteFailed { address: 0x0C03 };
        assert_eq!(e.to_string(), "Failed to write byte at address 0x0C03");
        assert!(!e.is_link_error());
    }
}
