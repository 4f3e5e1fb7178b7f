use super::constants::METADATA_BLOCK_PICTURE;
use super::tag::VorbisComments;
use super::verify_signature;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, err, parse_mode_choice};
use crate::picture::Picture;
use crate::tag::TagType;
use crate::util::text::latin1_decode;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use oggpage::{Packets, PageHeader};

/// The header packets of a stream, and the comments found in them
pub(super) struct OggHeaders {
	pub(super) comments: Option<VorbisComments>,
	pub(super) first_page_header: PageHeader,
	pub(super) packets: Packets,
}

/// Parse a comment header, without its packet signature or framing bit
///
/// A field claiming more bytes than remain (or more than the allocation limit) ends the
/// parse, and everything read up to that point is returned.
pub(crate) fn read_comments(data: &mut &[u8], parse_options: ParseOptions) -> Result<VorbisComments> {
	let parse_mode = parse_options.parsing_mode;

	let vendor_len = data.read_u32::<LittleEndian>()? as usize;
	if vendor_len > data.len() {
		err!(SizeMismatch);
	}

	let (vendor_bytes, rest) = data.split_at(vendor_len);
	*data = rest;

	let vendor = match std::str::from_utf8(vendor_bytes) {
		Ok(vendor) => vendor.to_owned(),
		Err(e) => {
			if parse_mode == ParsingMode::Strict {
				return Err(e.into());
			}

			// Some encoders write the vendor as Latin-1
			log::warn!("Vendor string is not valid UTF-8, decoding it as Latin-1");
			latin1_decode(vendor_bytes)
		},
	};

	let declared_count = data.read_u32::<LittleEndian>()?;

	let mut tag = VorbisComments {
		vendor,
		items: Vec::new(),
		pictures: Vec::new(),
	};

	// Every field needs at least 4 bytes for its length
	tag.items.reserve((declared_count as usize).min(data.len() / 4));

	for index in 0..declared_count {
		let comment_len = match data.read_u32::<LittleEndian>() {
			Ok(len) => len as usize,
			Err(_) => {
				truncated(parse_mode, index, declared_count)?;
				break;
			},
		};

		if comment_len > data.len() || comment_len > parse_options.allocation_limit {
			log::warn!(
				"Field {index} claims {comment_len} bytes, only {} remain",
				data.len()
			);
			truncated(parse_mode, index, declared_count)?;
			break;
		}

		let (comment, rest) = data.split_at(comment_len);
		*data = rest;

		read_field(&mut tag, comment, parse_options)?;
	}

	Ok(tag)
}

fn truncated(parse_mode: ParsingMode, index: u32, declared_count: u32) -> Result<()> {
	parse_mode_choice!(
		parse_mode,
		STRICT: err!(SizeMismatch),
		DEFAULT: log::warn!("Comments truncated after {index} of {declared_count} fields, keeping what was read")
	);

	Ok(())
}

fn read_field(tag: &mut VorbisComments, comment: &[u8], parse_options: ParseOptions) -> Result<()> {
	let parse_mode = parse_options.parsing_mode;

	// KEY=VALUE
	let Some(separator) = comment.iter().position(|b| *b == b'=') else {
		log::warn!("No separator found in field, discarding");
		return Ok(());
	};

	let (key, value) = (&comment[..separator], &comment[separator + 1..]);

	let key = match std::str::from_utf8(key) {
		Ok(key) if TagType::VorbisComments.accepts_custom_key(key) => key,
		_ => {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL "Vorbis comments contain an invalid key"),
				DEFAULT: log::warn!("Discarding field with an invalid key")
			);

			return Ok(());
		},
	};

	if key.eq_ignore_ascii_case(METADATA_BLOCK_PICTURE) {
		if !parse_options.read_cover_art {
			return Ok(());
		}

		match Picture::from_flac_bytes(value, true, parse_mode) {
			Ok(picture) => tag.pictures.push(picture),
			Err(e) => {
				if parse_mode == ParsingMode::Strict {
					return Err(e);
				}

				log::warn!("Failed to decode FLAC picture, discarding field");
			},
		}

		return Ok(());
	}

	let value = match std::str::from_utf8(value) {
		Ok(value) => value,
		Err(e) => {
			if parse_mode == ParsingMode::Strict {
				return Err(e.into());
			}

			log::warn!("Non UTF-8 value found, discarding field {key:?}");
			return Ok(());
		},
	};

	// TRACKNUMBER and DISCNUMBER are sometimes written as "current/total"
	let total_key = if key.eq_ignore_ascii_case("TRACKNUMBER") {
		Some("TRACKTOTAL")
	} else if key.eq_ignore_ascii_case("DISCNUMBER") {
		Some("DISCTOTAL")
	} else {
		None
	};

	if let Some(total_key) = total_key
		&& let Some((current, total)) = value.split_once('/')
		&& let (Ok(current), Ok(total)) = (current.trim().parse::<u32>(), total.trim().parse::<u32>())
	{
		tag.items.push((key.to_owned(), current.to_string()));
		if tag.get(total_key).is_none() {
			tag.items.push((String::from(total_key), total.to_string()));
		}

		return Ok(());
	}

	tag.items.push((key.to_owned(), value.to_owned()));
	Ok(())
}

/// Read the header packets of a stream
///
/// `packet_count` is the number of header packets the codec has, the first being the
/// identification header and the second the comment header.
pub(super) fn read_headers<R>(
	data: &mut R,
	ident_sig: &[u8],
	comment_sig: &[u8],
	packet_count: isize,
	parse_options: ParseOptions,
) -> Result<OggHeaders>
where
	R: Read + Seek,
{
	debug_assert!(packet_count >= 2);

	let start = data.stream_position()?;
	let first_page_header = PageHeader::read(data)?;
	data.seek(SeekFrom::Start(start))?;

	let packets = Packets::read_count(data, packet_count)?;

	let Some(ident_packet) = packets.get(0) else {
		decode_err!(@BAIL "Ogg: Expected identification packet");
	};
	verify_signature(ident_packet, ident_sig)?;

	let Some(comment_packet) = packets.get(1) else {
		decode_err!(@BAIL "Ogg: Expected comment packet");
	};
	verify_signature(comment_packet, comment_sig)?;

	let comments = if parse_options.read_tags {
		let mut content = &comment_packet[comment_sig.len()..];
		Some(read_comments(&mut content, parse_options)?)
	} else {
		None
	};

	Ok(OggHeaders {
		comments,
		first_page_header,
		packets,
	})
}
