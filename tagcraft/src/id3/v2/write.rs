use super::synch_u32;
use super::tag::Id3v2Tag;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::{err, try_vec};

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

/// Encode a tag as ID3v2.4
///
/// Empty frames are skipped. An empty tag produces no bytes at all, which strips the tag.
pub(crate) fn create_tag(tag: &Id3v2Tag, write_options: WriteOptions) -> Result<Vec<u8>> {
	let mut frames: Vec<u8> = Vec::new();

	for frame in tag.frames() {
		if frame.is_empty() {
			log::debug!("ID3v2: Skipping empty frame \"{}\"", frame.id());
			continue;
		}

		let content = frame.content()?;
		let Ok(len) = u32::try_from(content.len()) else {
			err!(TooMuchData);
		};

		frames.write_all(frame.id().as_bytes())?;
		frames.write_u32::<BigEndian>(synch_u32(len)?)?;
		// No flags are ever written
		frames.write_u16::<BigEndian>(0)?;
		frames.write_all(&content)?;
	}

	if frames.is_empty() {
		return Ok(Vec::new());
	}

	let padding_len = write_options.preferred_padding.unwrap_or(0) as usize;
	let Ok(size) = u32::try_from(frames.len() + padding_len) else {
		err!(TooMuchData);
	};

	let mut id3v2 = Vec::with_capacity(10 + frames.len() + padding_len);
	id3v2.write_all(b"ID3")?;
	// Version 2.4.0, no flags
	id3v2.write_all(&[4, 0, 0])?;
	id3v2.write_u32::<BigEndian>(synch_u32(size)?)?;
	id3v2.extend(frames);

	if padding_len > 0 {
		log::trace!("ID3v2: Padding tag with {padding_len} bytes");
		id3v2.extend(try_vec![0; padding_len]);
	}

	Ok(id3v2)
}
