//! ID3 specific items
//!
//! Only ID3v2 is supported, and only as far as WAV files need it. See [`v2`] for the details.

pub mod v2;

use crate::error::Result;
use v2::header::Id3v2Header;

use std::io::{Read, Seek, SeekFrom};

/// Skip an ID3v2 tag at the current position
///
/// Returns the full size of the tag, including its header and footer. If there is no tag, the
/// reader is left where it was.
pub(crate) fn skip_id3v2<R>(data: &mut R) -> Result<Option<u32>>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;

	let Ok(header) = Id3v2Header::parse(data) else {
		data.seek(SeekFrom::Start(start))?;
		return Ok(None);
	};

	log::debug!("Skipping an ID3v2 tag at offset {start}");

	let full_size = header.full_tag_size();
	data.seek(SeekFrom::Start(start + u64::from(full_size)))?;

	Ok(Some(full_size))
}

#[cfg(test)]
mod tests {
	use super::skip_id3v2;

	use std::io::{Cursor, Seek};

	#[test_log::test]
	fn skip() {
		let mut data = b"ID3\x04\x00\x00\x00\x00\x01\x00".to_vec();
		data.extend([0; 128]);
		data.extend(b"fLaC");

		let mut reader = Cursor::new(data);
		assert_eq!(skip_id3v2(&mut reader).unwrap(), Some(138));
		assert_eq!(reader.stream_position().unwrap(), 138);
	}

	#[test_log::test]
	fn no_tag() {
		let mut reader = Cursor::new(b"fLaC\0\0\0\x22".to_vec());
		assert_eq!(skip_id3v2(&mut reader).unwrap(), None);
		assert_eq!(reader.stream_position().unwrap(), 0);
	}
}
