use super::FlacFile;
use super::block::{BLOCK_ID_PICTURE, BLOCK_ID_STREAMINFO, BLOCK_ID_VORBIS_COMMENTS, Block};
use super::properties::{FlacProperties, read_properties};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::id3::skip_id3v2;
use crate::macros::{decode_err, err, parse_mode_choice};
use crate::ogg::read::read_comments;
use crate::picture::Picture;

use std::io::{Read, Seek, SeekFrom};

// Everything up to and including the total sample count
const MIN_STREAMINFO_SIZE: usize = 18;

/// Search for the `fLaC` marker, allowing up to `max_junk_bytes` of junk in front of it
///
/// On success, the reader is left at the marker and the amount of junk is returned. Otherwise,
/// the reader's position is restored.
pub(crate) fn find_marker<R>(data: &mut R, max_junk_bytes: usize) -> std::io::Result<Option<u64>>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;

	let mut window = Vec::new();
	data.by_ref()
		.take(max_junk_bytes as u64 + 4)
		.read_to_end(&mut window)?;

	let Some(junk) = window.windows(4).position(|w| w == b"fLaC") else {
		data.seek(SeekFrom::Start(start))?;
		return Ok(None);
	};

	let junk = junk as u64;
	data.seek(SeekFrom::Start(start + junk))?;
	Ok(Some(junk))
}

/// Check for the `fLaC` marker, returning the STREAMINFO block that has to follow it
pub(super) fn verify_flac<R>(data: &mut R) -> Result<Block>
where
	R: Read + Seek,
{
	let mut marker = [0; 4];
	data.read_exact(&mut marker)?;
	if &marker != b"fLaC" {
		decode_err!(@BAIL Flac, "Stream does not start with \"fLaC\"");
	}

	let stream_info = Block::read(data, |_| true)?;
	match stream_info.ty {
		BLOCK_ID_STREAMINFO if stream_info.content.len() >= MIN_STREAMINFO_SIZE => {},
		BLOCK_ID_STREAMINFO => decode_err!(@BAIL Flac, "STREAMINFO block is too short"),
		_ => decode_err!(@BAIL Flac, "First metadata block is not STREAMINFO"),
	}

	log::debug!("FLAC: Found STREAMINFO ({} bytes)", stream_info.content.len());
	Ok(stream_info)
}

pub(super) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<FlacFile>
where
	R: Read + Seek,
{
	if let Some(skipped) = skip_id3v2(data)? {
		log::warn!("FLAC: Ignoring a leading {skipped} byte ID3v2 tag, it is left untouched on write");
	}

	if let Some(junk @ 1..) = find_marker(data, parse_options.max_junk_bytes)? {
		log::warn!("FLAC: Skipped {junk} junk bytes before the stream marker");
	}

	let stream_info = verify_flac(data)?;
	let parse_mode = parse_options.parsing_mode;

	let mut vorbis_comments_tag = None;
	let mut pictures = Vec::new();

	let wanted = |ty: u8| match ty {
		BLOCK_ID_VORBIS_COMMENTS => parse_options.read_tags,
		BLOCK_ID_PICTURE => parse_options.read_cover_art,
		_ => false,
	};

	let mut last = stream_info.last;
	while !last {
		let block = Block::read(data, wanted)?;
		last = block.last;

		if block.content.is_empty() {
			continue;
		}

		match block.ty {
			BLOCK_ID_VORBIS_COMMENTS => {
				// Writing collapses duplicates into one block, the last one read is kept
				if vorbis_comments_tag.is_some() {
					parse_mode_choice!(
						parse_mode,
						STRICT: decode_err!(@BAIL Flac, "Stream has more than one Vorbis Comments block"),
						DEFAULT: log::warn!("FLAC: Multiple Vorbis Comments blocks, keeping the last")
					);
				}

				vorbis_comments_tag = Some(read_comments(&mut &*block.content, parse_options)?);
			},
			BLOCK_ID_PICTURE => {
				match Picture::from_flac_bytes(&block.content, false, parse_mode) {
					Ok(picture) => pictures.push(picture),
					Err(e) if parse_mode == ParsingMode::Strict => return Err(e),
					Err(e) => log::warn!("FLAC: Discarding unreadable picture block: {e}"),
				}
			},
			_ => {},
		}
	}

	let properties = if parse_options.read_properties {
		let audio_start = data.stream_position()?;
		let file_length = data.seek(SeekFrom::End(0))?;

		// Only possible if a block overstated its size
		let Some(stream_length) = file_length.checked_sub(audio_start) else {
			err!(SizeMismatch);
		};

		read_properties(&mut &*stream_info.content, stream_length, file_length)?
	} else {
		FlacProperties::default()
	};

	Ok(FlacFile {
		vorbis_comments_tag,
		pictures,
		properties,
	})
}
