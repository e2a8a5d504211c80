//! at49prog-serial - Serial bridge link for at49prog
//!
//! This crate talks to the microcontroller bridge that drives the AT49F512's
//! parallel bus, and implements the streaming transfer engine on top of the
//! framing in [`at49prog_core::protocol`].
//!
//! # Protocol Overview
//!
//! After reset the bridge sends the 4-byte ready marker `INIT`. From then on
//! the link is strictly request/response: the host sends one packet, the
//! bridge answers with zero or more diagnostic text frames followed by one
//! result frame. Transfers are one exchange per byte; only the first packet
//! of a transfer carries the address.
//!
//! # Example
//!
//! ```no_run
//! use at49prog_core::progress::NoProgress;
//! use at49prog_core::range::AddressRange;
//! use at49prog_serial::{Bridge, SerialTransport};
//! use std::time::Duration;
//!
//! let timeout = Duration::from_secs(600);
//! let transport = SerialTransport::open("/dev/ttyACM0", 115200, timeout)?;
//! let mut bridge = Bridge::connect(transport, timeout)?;
//! let range = AddressRange::new(0x0000, 0x0100)?;
//! let digest = bridge.read_range(range, &mut std::io::sink(), &mut NoProgress)?;
//! println!("SHA256: {}", digest);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod device;
pub mod error;
pub mod transport;

// Re-exports
pub use device::Bridge;
pub use error::{BridgeError, Result};
pub use transport::SerialTransport;
