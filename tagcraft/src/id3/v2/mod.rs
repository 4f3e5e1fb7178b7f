//! ID3v2 items and utilities
//!
//! ## Important notes
//!
//! This is a minimal implementation, used for the `id3 ` chunk of WAV files:
//!
//! * Tags are read in versions 2.3 and 2.4, and always written as ID3v2.4.
//! * Text frames, `COMM`, `USLT`, and `TXXX` are decoded, every other frame is kept as opaque
//!   binary data. See [`Frame`].
//! * Compressed and encrypted frames are discarded.

mod frame;
pub(crate) mod header;
mod read;
mod tag;
pub(crate) mod write;

use crate::error::Result;
use crate::macros::err;

// Exports

pub use frame::Frame;
pub use header::Id3v2Version;
pub use tag::Id3v2Tag;

pub(crate) use read::parse_id3v2;

/// Decode a synchsafe integer, where only the lower 7 bits of each byte are used
pub(crate) fn unsynch_u32(n: u32) -> u32 {
	n & 0xFF | (n & 0xFF00) >> 1 | (n & 0xFF_0000) >> 2 | (n & 0xFF00_0000) >> 3
}

/// Encode a synchsafe integer
///
/// # Errors
///
/// `n` doesn't fit in 28 bits
pub(crate) fn synch_u32(n: u32) -> Result<u32> {
	if n > 0x0FFF_FFFF {
		err!(TooMuchData);
	}

	Ok(n & 0x7F | (n & 0x3F80) << 1 | (n & 0x1F_C000) << 2 | (n & 0x0FE0_0000) << 3)
}

/// Undo unsynchronisation, removing the `0x00` following every `0xFF`
pub(crate) fn resynchronise(content: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(content.len());

	let mut previous_ff = false;
	for byte in content {
		if previous_ff && *byte == 0 {
			previous_ff = false;
			continue;
		}

		previous_ff = *byte == 0xFF;
		out.push(*byte);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::{resynchronise, synch_u32, unsynch_u32};

	#[test_log::test]
	fn synchsafe() {
		assert_eq!(unsynch_u32(0x0000_0201), 257);
		assert_eq!(synch_u32(257).unwrap(), 0x0000_0201);
		assert_eq!(synch_u32(0x0FFF_FFFF).unwrap(), 0x7F7F_7F7F);
		assert_eq!(unsynch_u32(0x7F7F_7F7F), 0x0FFF_FFFF);
		assert!(synch_u32(0x1000_0000).is_err());
	}

	#[test_log::test]
	fn resynchronisation() {
		assert_eq!(
			resynchronise(&[0xFF, 0x00, 0x1A, 0xFF, 0x00, 0x15, 0x00]),
			[0xFF, 0x1A, 0xFF, 0x15, 0x00]
		);
		assert_eq!(resynchronise(&[0xFF, 0x00, 0x00]), [0xFF, 0x00]);
	}
}
