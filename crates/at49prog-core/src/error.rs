//! Error types for at49prog-core
//!
//! Everything here is raised before the link is opened. Link and device
//! failures live with the bridge implementation.

use core::fmt;

/// Configuration error - bad or contradictory operation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// An address bound was given for a chip erase
    EraseWithAddress,
    /// The operation needs a payload but none was supplied
    MissingPayload,
    /// The resolved range contains no addresses
    EmptyRange {
        /// Resolved start address
        start: u32,
    },
    /// Bounds do not describe a valid range on the chip
    InvalidRange {
        /// Requested start address
        start: u32,
        /// Requested end address (exclusive)
        end: u32,
    },
    /// A reference checksum could not be parsed
    InvalidDigest,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EraseWithAddress => write!(
                f,
                "address-based erasure is not supported on this chip, only the whole chip can be erased"
            ),
            Self::MissingPayload => write!(f, "operation requires a payload file"),
            Self::EmptyRange { start } => {
                write!(f, "address range starting at 0x{:04X} is empty", start)
            }
            Self::InvalidRange { start, end } => write!(
                f,
                "invalid address range 0x{:04X}..0x{:04X}",
                start, end
            ),
            Self::InvalidDigest => write!(f, "reference checksum is not a 64 digit hex string"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type alias using [`ConfigError`]
pub type Result<T> = core::result::Result<T, ConfigError>;
