//! Hex dump rendering for read chunks

use at49prog_core::transfer::CHUNK_SIZE;
use std::fmt::Write;

/// Render one chunk as `addr    hex bytes    |ascii|`
///
/// Short chunks are padded so the ASCII column stays aligned.
pub fn format_line(address: u32, data: &[u8]) -> String {
    let mut line = String::with_capacity(80);
    let _ = write!(line, "{:04x}    ", address);

    for i in 0..CHUNK_SIZE {
        match data.get(i) {
            Some(b) => {
                let _ = write!(line, "{:02x} ", b);
            }
            None => line.push_str("   "),
        }
        if i == CHUNK_SIZE / 2 - 1 {
            line.push_str("   ");
        }
    }

    line.push_str("   |");
    for &b in data {
        line.push(if (0x20..=0x7E).contains(&b) {
            b as char
        } else {
            '.'
        });
    }
    line.push('|');
    line
}
