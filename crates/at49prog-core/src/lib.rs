//! at49prog-core - Core logic for programming AT49F512 EEPROMs over a serial bridge
//!
//! The chip sits behind a microcontroller that performs the parallel bus
//! cycles. The host talks to that microcontroller over a serial link using a
//! small request/response protocol. This crate holds everything that does not
//! touch a real port:
//!
//! - [`range`] - resolution and validation of the `[start, end)` address range
//! - [`protocol`] - wire constants, outbound packet encoding, inbound frames
//! - [`transfer`] - per-transfer state (address cursor, checksum, dump chunks)
//! - [`checksum`] - incremental SHA-256 and printable digests
//! - [`verify`] - checksum comparison
//! - [`progress`] - observer trait for progress and diagnostic output
//! - [`link`] - the byte transport the transfer engine depends on
//!
//! # Example
//!
//! ```
//! use at49prog_core::range::{resolve, Mode, RangeRequest};
//!
//! let request = RangeRequest::new(Mode::Read).with_start(0xFFF0).with_end(0x10005);
//! let resolved = resolve(&request).unwrap();
//! assert_eq!(resolved.range.start(), 0xFFF0);
//! assert_eq!(resolved.range.end(), 0x10000);
//! assert_eq!(resolved.range.len(), 16);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod checksum;
pub mod error;
pub mod link;
pub mod progress;
pub mod protocol;
pub mod range;
pub mod transfer;
pub mod verify;

pub use checksum::{Checksum, Digest};
pub use error::{ConfigError, Result};
pub use link::Transport;
pub use progress::{NoProgress, Operation, TransferProgress};
pub use range::{AddressRange, Mode, RangeRequest, RangeWarning, ResolvedRange};
pub use verify::Verdict;
