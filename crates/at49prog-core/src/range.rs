//! Address range resolution
//!
//! Every operation works on a half-open interval `[start, end)` inside the
//! chip's 64 KiB address space. User supplied bounds are optional, may be out
//! of order and may point past the end of the chip; [`resolve`] turns them
//! into a validated [`AddressRange`] and reports every correction it made as
//! a [`RangeWarning`].

use crate::error::{ConfigError, Result};
use core::fmt;

/// Size of the chip's address space in bytes
pub const CHIP_SIZE: u32 = 0x10000;

/// Highest address that can start an operation
pub const MAX_START: u32 = CHIP_SIZE - 1;

/// A validated half-open address range
///
/// Invariant: `start < end <= CHIP_SIZE`. `end` itself is never accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: u32,
    end: u32,
}

impl AddressRange {
    /// The whole chip, `[0x0000, 0x10000)`
    pub const FULL_CHIP: Self = Self {
        start: 0,
        end: CHIP_SIZE,
    };

    /// Create a range, checking the invariant
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == end {
            return Err(ConfigError::EmptyRange { start });
        }
        if start > end || end > CHIP_SIZE {
            return Err(ConfigError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First address in the range
    pub fn start(&self) -> u32 {
        self.start
    }

    /// First address past the range
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of addresses in the range
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the range is empty (never true for a validated range)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the range covers the entire chip
    pub fn is_full_chip(&self) -> bool {
        *self == Self::FULL_CHIP
    }

    /// Whether `addr` lies inside the range
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Address of the byte at `offset` from the start of the range
    pub fn address_at(&self, offset: usize) -> u32 {
        self.start + offset as u32
    }

    /// Start address in the 16-bit form used on the wire
    pub fn start_u16(&self) -> u16 {
        // start <= MAX_START by construction
        self.start as u16
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}..0x{:04X}", self.start, self.end)
    }
}

/// Operation the range is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read the chip contents
    Read,
    /// Program a payload into the chip
    Write,
    /// Checksum the chip contents, optionally against a reference
    Verify,
    /// Erase the whole chip
    Erase,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Verify => "verify",
            Self::Erase => "erase",
        };
        f.write_str(name)
    }
}

/// Raw, unvalidated bounds as supplied by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    /// Operation mode
    pub mode: Mode,
    /// Requested start address
    pub start: Option<u32>,
    /// Requested end address (exclusive)
    pub end: Option<u32>,
    /// Length of the payload (write source or verify reference)
    pub payload_len: Option<usize>,
}

impl RangeRequest {
    /// A request with no bounds and no payload
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            start: None,
            end: None,
            payload_len: None,
        }
    }

    /// Set the start address
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the end address
    pub fn with_end(mut self, end: u32) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the payload length
    pub fn with_payload_len(mut self, len: usize) -> Self {
        self.payload_len = Some(len);
        self
    }
}

/// A correction or suspicious condition found while resolving a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeWarning {
    /// Start address was past the end of the chip
    StartClamped {
        /// The address that was asked for
        requested: u32,
    },
    /// End address was past the end of the chip
    EndClamped {
        /// The address that was asked for
        requested: u32,
    },
    /// Payload does not fit between start and the end of the chip
    PayloadExceedsChip {
        /// Payload length in bytes
        payload_len: usize,
        /// Bytes that will actually be written
        range_len: usize,
    },
    /// Payload is longer than the explicitly selected range
    PayloadTruncated {
        /// Payload length in bytes
        payload_len: usize,
        /// Bytes that will actually be written
        range_len: usize,
    },
    /// Reference payload length differs from the range length
    PayloadLengthMismatch {
        /// Reference length in bytes
        payload_len: usize,
        /// Range length in bytes
        range_len: usize,
    },
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartClamped { requested } => write!(
                f,
                "start address 0x{:X} is past end of chip, using 0x{:04X} instead",
                requested, MAX_START
            ),
            Self::EndClamped { requested } => write!(
                f,
                "end address 0x{:X} is past end of chip, using 0x{:05X} instead",
                requested, CHIP_SIZE
            ),
            Self::PayloadExceedsChip {
                payload_len,
                range_len,
            } => write!(
                f,
                "file is larger than chip ({} bytes), only {} bytes will be written",
                payload_len, range_len
            ),
            Self::PayloadTruncated {
                payload_len,
                range_len,
            } => write!(
                f,
                "file ({} bytes) is larger than selected address range ({} bytes)",
                payload_len, range_len
            ),
            Self::PayloadLengthMismatch {
                payload_len,
                range_len,
            } => write!(
                f,
                "file size ({} bytes) does not match the address range ({} bytes), verification will fail",
                payload_len, range_len
            ),
        }
    }
}

/// A validated range plus the warnings produced while resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    /// Operation mode the range was resolved for
    pub mode: Mode,
    /// The validated range
    pub range: AddressRange,
    /// Corrections applied and conditions worth reporting
    pub warnings: Vec<RangeWarning>,
}

impl ResolvedRange {
    /// Whether resolving produced a warning of the given kind
    pub fn has_warning(&self, pred: impl Fn(&RangeWarning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }
}

/// Resolve user supplied bounds into a validated range
///
/// Rules, applied in order:
/// 1. Erase takes no bounds and always covers the whole chip.
/// 2. `start > 0xFFFF` and `end > 0x10000` are clamped with a warning.
/// 3. If both bounds are given and out of order they are swapped.
/// 4. Missing `start` is `0`. Missing `end` is `0x10000`, or in write mode
///    `start + payload_len`.
/// 5. In write mode `end` never extends past `start + payload_len`.
/// 6. In verify mode a reference payload whose length differs from the range
///    only produces a warning.
pub fn resolve(request: &RangeRequest) -> Result<ResolvedRange> {
    if request.mode == Mode::Erase {
        if request.start.is_some() || request.end.is_some() {
            return Err(ConfigError::EraseWithAddress);
        }
        return Ok(ResolvedRange {
            mode: Mode::Erase,
            range: AddressRange::FULL_CHIP,
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();

    let mut start = request.start.map(|requested| {
        if requested > MAX_START {
            warnings.push(RangeWarning::StartClamped { requested });
            MAX_START
        } else {
            requested
        }
    });
    let mut end = request.end.map(|requested| {
        if requested > CHIP_SIZE {
            warnings.push(RangeWarning::EndClamped { requested });
            CHIP_SIZE
        } else {
            requested
        }
    });

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            log::debug!("Swapping out of order bounds 0x{:04X} and 0x{:04X}", s, e);
            start = Some(e);
            end = Some(s);
        }
    }

    let start = start.unwrap_or(0);
    let end = match request.mode {
        Mode::Write => {
            let payload_len = request.payload_len.ok_or(ConfigError::MissingPayload)?;
            let payload_end = u64::from(start) + payload_len as u64;
            match end {
                None if payload_end > u64::from(CHIP_SIZE) => {
                    warnings.push(RangeWarning::PayloadExceedsChip {
                        payload_len,
                        range_len: (CHIP_SIZE - start) as usize,
                    });
                    CHIP_SIZE
                }
                None => payload_end as u32,
                Some(e) if u64::from(e) > payload_end => {
                    log::debug!(
                        "End 0x{:04X} is past the payload, using 0x{:04X}",
                        e,
                        payload_end
                    );
                    payload_end as u32
                }
                Some(e) => {
                    if u64::from(e) < payload_end {
                        warnings.push(RangeWarning::PayloadTruncated {
                            payload_len,
                            range_len: (e - start) as usize,
                        });
                    }
                    e
                }
            }
        }
        Mode::Read | Mode::Verify | Mode::Erase => end.unwrap_or(CHIP_SIZE),
    };

    if request.mode == Mode::Verify {
        if let Some(payload_len) = request.payload_len {
            let range_len = end.saturating_sub(start) as usize;
            if payload_len != range_len {
                warnings.push(RangeWarning::PayloadLengthMismatch {
                    payload_len,
                    range_len,
                });
            }
        }
    }

    let range = AddressRange::new(start, end)?;

    for warning in &warnings {
        log::warn!("{}", warning);
    }

    Ok(ResolvedRange {
        mode: request.mode,
        range,
        warnings,
    })
}
