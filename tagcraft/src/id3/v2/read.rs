use super::frame::{Frame, is_valid_frame_id};
use super::header::{Id3v2Header, Id3v2Version};
use super::tag::Id3v2Tag;
use super::{resynchronise, unsynch_u32};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, parse_mode_choice, try_vec};

use std::borrow::Cow;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

const FRAME_HEADER_SIZE: usize = 10;

/// Read an ID3v2 tag, starting at its header
pub(crate) fn parse_id3v2<R>(bytes: &mut R, parse_options: ParseOptions) -> Result<Id3v2Tag>
where
	R: Read,
{
	let header = Id3v2Header::parse(bytes)?;

	let mut content = try_vec![0; header.size as usize, parse_options.allocation_limit];
	bytes.read_exact(&mut content)?;

	// ID3v2.3 unsynchronises the entire tag, ID3v2.4 does it per frame
	if header.unsynchronisation && header.version == Id3v2Version::V3 {
		content = resynchronise(&content);
	}

	let frames_start = (header.extended_size as usize).min(content.len());
	read_frames(&content[frames_start..], header, parse_options)
}

fn read_frames(mut content: &[u8], header: Id3v2Header, parse_options: ParseOptions) -> Result<Id3v2Tag> {
	let parse_mode = parse_options.parsing_mode;
	let mut tag = Id3v2Tag {
		original_version: header.version,
		frames: Vec::new(),
	};

	while content.len() >= FRAME_HEADER_SIZE {
		// Padding
		if content[0] == 0 {
			break;
		}

		let id = match std::str::from_utf8(&content[..4]) {
			Ok(id) if is_valid_frame_id(id) => id.to_owned(),
			_ => {
				parse_mode_choice!(
					parse_mode,
					STRICT: decode_err!(@BAIL "ID3v2: Found an invalid frame ID"),
					DEFAULT: log::warn!("ID3v2: Found an invalid frame ID, stopping")
				);
				break;
			},
		};

		let size = match header.version {
			Id3v2Version::V3 => BigEndian::read_u32(&content[4..8]),
			Id3v2Version::V4 => unsynch_u32(BigEndian::read_u32(&content[4..8])),
		} as usize;
		let flags = BigEndian::read_u16(&content[8..10]);

		content = &content[FRAME_HEADER_SIZE..];

		if size > content.len() {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL "ID3v2: Frame is larger than the tag"),
				DEFAULT: log::warn!("ID3v2: Frame \"{id}\" is larger than the tag, stopping")
			);
			break;
		}

		let (frame_content, rest) = content.split_at(size);
		content = rest;

		if size == 0 {
			log::warn!("ID3v2: Discarding empty frame \"{id}\"");
			continue;
		}

		let Some(frame_content) = frame_content_for(&id, frame_content, flags, header) else {
			continue;
		};

		let id = upgrade_id(id, header.version);
		log::trace!("ID3v2: Reading frame \"{id}\" ({size} bytes)");

		match Frame::parse(id, &frame_content) {
			Ok(frame) => tag.frames.push(frame),
			Err(e) => {
				if parse_mode == ParsingMode::Strict {
					return Err(e);
				}

				log::warn!("ID3v2: Discarding unreadable frame: {e}");
			},
		}
	}

	Ok(tag)
}

/// Strip the extra data described by a frame's flags
///
/// Returns `None` for frames that can't be decoded.
fn frame_content_for<'a>(
	id: &str,
	mut content: &'a [u8],
	flags: u16,
	header: Id3v2Header,
) -> Option<Cow<'a, [u8]>> {
	let (grouping, compressed, encrypted, unsynchronised, data_length_indicator) =
		match header.version {
			Id3v2Version::V3 => (flags & 0x0020 != 0, flags & 0x0080 != 0, flags & 0x0040 != 0, false, false),
			Id3v2Version::V4 => (
				flags & 0x0040 != 0,
				flags & 0x0008 != 0,
				flags & 0x0004 != 0,
				header.unsynchronisation || flags & 0x0002 != 0,
				flags & 0x0001 != 0,
			),
		};

	if compressed || encrypted {
		log::warn!("ID3v2: Discarding compressed or encrypted frame \"{id}\"");
		return None;
	}

	if grouping {
		content = content.get(1..)?;
	}

	if data_length_indicator {
		content = content.get(4..)?;
	}

	if unsynchronised {
		return Some(Cow::Owned(resynchronise(content)));
	}

	Some(Cow::Borrowed(content))
}

// ID3v2.3 frames with a direct ID3v2.4 replacement
fn upgrade_id(id: String, version: Id3v2Version) -> String {
	if version == Id3v2Version::V4 {
		return id;
	}

	match id.as_str() {
		"TYER" => String::from("TDRC"),
		"TORY" => String::from("TDOR"),
		_ => id,
	}
}

#[cfg(test)]
mod tests {
	use super::parse_id3v2;
	use crate::config::{ParseOptions, ParsingMode};
	use crate::id3::v2::{Frame, Id3v2Version, synch_u32};
	use crate::tag::Accessor;

	fn frame(id: &[u8; 4], content: &[u8], v4: bool) -> Vec<u8> {
		let size = content.len() as u32;
		let size = if v4 { synch_u32(size).unwrap() } else { size };

		let mut frame = id.to_vec();
		frame.extend(size.to_be_bytes());
		frame.extend([0, 0]);
		frame.extend(content);
		frame
	}

	fn tag(version: u8, flags: u8, frames: &[u8]) -> Vec<u8> {
		let mut tag = vec![b'I', b'D', b'3', version, 0, flags];
		tag.extend(synch_u32(frames.len() as u32 + 16).unwrap().to_be_bytes());
		tag.extend(frames);
		tag.extend([0; 16]);
		tag
	}

	#[test_log::test]
	fn v3() {
		let mut frames = frame(b"TIT2", b"\x00Foo title", false);
		frames.extend(frame(b"TYER", b"\x001984", false));
		frames.extend(frame(b"TRCK", b"\x005/12", false));

		let tag = parse_id3v2(&mut &tag(3, 0, &frames)[..], ParseOptions::new()).unwrap();
		assert_eq!(tag.original_version(), Id3v2Version::V3);
		assert_eq!(tag.title().as_deref(), Some("Foo title"));
		assert_eq!(tag.get_text("TDRC"), Some("1984"));
		assert_eq!(tag.year(), Some(1984));
		assert_eq!(tag.track(), Some(5));
		assert_eq!(tag.track_total(), Some(12));
	}

	#[test_log::test]
	fn v4_flags() {
		// Grouping identifier and data length indicator
		let mut frames = frame(b"TIT2", b"\x01\x00\x00\x00\x04\x03Bar", true);
		frames[8..10].copy_from_slice(&[0x00, 0x41]);

		// Unsynchronised
		let mut unsynch = frame(b"PRIV", b"a\xFF\x00\xE0", true);
		unsynch[8..10].copy_from_slice(&[0x00, 0x02]);
		frames.extend(unsynch);

		// Compressed, discarded
		let mut compressed = frame(b"TALB", b"\x78\x9C", true);
		compressed[8..10].copy_from_slice(&[0x00, 0x08]);
		frames.extend(compressed);

		let tag = parse_id3v2(&mut &tag(4, 0, &frames)[..], ParseOptions::new()).unwrap();
		assert_eq!(tag.title().as_deref(), Some("Bar"));
		assert_eq!(
			tag.get("PRIV"),
			Some(&Frame::Binary {
				id: String::from("PRIV"),
				data: b"a\xFF\xE0".to_vec()
			})
		);
		assert_eq!(tag.album(), None);
	}

	#[test_log::test]
	fn bad_frames() {
		let mut frames = frame(b"TIT2", b"\x09Foo", true);
		frames.extend(frame(b"TPE1", b"\x00Bar artist", true));
		frames.extend(b"tit2\x00\x00\x00\x01\x00\x00\x00");

		let data = tag(4, 0, &frames);

		let tag = parse_id3v2(&mut &data[..], ParseOptions::new()).unwrap();
		assert_eq!(tag.frames().count(), 1);
		assert_eq!(tag.artist().as_deref(), Some("Bar artist"));

		assert!(
			parse_id3v2(
				&mut &data[..],
				ParseOptions::new().parsing_mode(ParsingMode::Strict)
			)
			.is_err()
		);
	}

	#[test_log::test]
	fn oversized_frame() {
		let mut frames = frame(b"TPE1", b"\x00Bar artist", true);
		let mut oversized = frame(b"TIT2", b"\x00Foo", true);
		oversized[4..8].copy_from_slice(&synch_u32(1000).unwrap().to_be_bytes());
		frames.extend(oversized);

		let data = tag(4, 0, &frames);
		let tag = parse_id3v2(&mut &data[..], ParseOptions::new()).unwrap();
		assert_eq!(tag.frames().count(), 1);
	}
}
