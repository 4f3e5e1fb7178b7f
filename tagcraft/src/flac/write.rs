use super::block::{BLOCK_ID_PADDING, BLOCK_ID_PICTURE, BLOCK_ID_VORBIS_COMMENTS, Block};
use super::read::{find_marker, verify_flac};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::id3::skip_id3v2;
use crate::ogg::VorbisComments;
use crate::ogg::write::create_comment_block;
use crate::picture::{Picture, PictureInformation};
use crate::util::io::{FileLike, overwrite};

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

/// Write Vorbis comments to a FLAC file
///
/// The tag's pictures are written as `PICTURE` blocks.
pub(crate) fn write_to<F>(file: &mut F, tag: &VorbisComments, write_options: WriteOptions) -> Result<()>
where
	F: FileLike + ?Sized,
{
	write_blocks(file, tag, &tag.pictures, write_options)
}

pub(super) fn write_blocks<'a, F, P>(
	file: &mut F,
	tag: &VorbisComments,
	pictures: P,
	write_options: WriteOptions,
) -> Result<()>
where
	F: FileLike + ?Sized,
	P: IntoIterator<Item = &'a (Picture, PictureInformation)>,
{
	file.rewind()?;
	let mut contents = Vec::new();
	file.read_to_end(&mut contents)?;

	let Some(rebuilt) = rebuild(contents, tag, pictures, write_options)? else {
		log::debug!("FLAC: Nothing to do");
		return Ok(());
	};

	overwrite(file, &rebuilt)
}

fn rebuild<'a, P>(
	contents: Vec<u8>,
	tag: &VorbisComments,
	pictures: P,
	write_options: WriteOptions,
) -> Result<Option<Vec<u8>>>
where
	P: IntoIterator<Item = &'a (Picture, PictureInformation)>,
{
	let mut cursor = Cursor::new(contents);

	// An ID3v2 tag in front of the stream is left alone, as is any junk after it
	skip_id3v2(&mut cursor)?;
	find_marker(&mut cursor, ParseOptions::DEFAULT_MAX_JUNK_BYTES)?;

	let stream_info = verify_flac(&mut cursor)?;
	let mut metadata_range = (stream_info.start as usize)..(stream_info.end as usize);

	let mut is_last_block = stream_info.last;
	let mut blocks = vec![stream_info];

	let mut file_vendor = None;
	let mut has_blocks_to_remove = false;

	while !is_last_block {
		let block = Block::read(&mut cursor, |ty| {
			ty != BLOCK_ID_PICTURE && ty != BLOCK_ID_PADDING
		})?;

		is_last_block = block.last;
		metadata_range.end = block.end as usize;

		match block.ty {
			BLOCK_ID_VORBIS_COMMENTS => {
				file_vendor = file_vendor.or_else(|| read_vendor(&block.content));
				has_blocks_to_remove = true;
			},
			// Padding is rewritten from `WriteOptions::preferred_padding`
			BLOCK_ID_PADDING | BLOCK_ID_PICTURE => has_blocks_to_remove = true,
			_ => blocks.push(block),
		}
	}

	let mut new_blocks = Vec::new();

	if !tag.items.is_empty() {
		let vendor = match &file_vendor {
			Some(vendor) if tag.vendor.is_empty() => vendor.as_str(),
			_ => tag.vendor.as_str(),
		};

		new_blocks.push(Block::new(
			BLOCK_ID_VORBIS_COMMENTS,
			create_comment_block(tag, vendor, false)?,
		)?);
	}

	for (picture, information) in pictures {
		new_blocks.push(Block::new(
			BLOCK_ID_PICTURE,
			picture.as_flac_bytes(*information, false),
		)?);
	}

	// Attempting to strip an already empty file
	if !has_blocks_to_remove && new_blocks.is_empty() {
		return Ok(None);
	}

	blocks.extend(new_blocks);

	if let Some(preferred_padding) = write_options.preferred_padding {
		log::debug!("FLAC: Adding {preferred_padding} bytes of padding");
		blocks.push(Block::new(
			BLOCK_ID_PADDING,
			vec![0; preferred_padding as usize],
		)?);
	}

	let block_count = blocks.len();
	let mut encoded_metadata = Vec::new();
	for (index, mut block) in blocks.into_iter().enumerate() {
		block.last = index == block_count - 1;
		block.write_to(&mut encoded_metadata)?;

		log::trace!(
			"Wrote a block (ty: {}, size: {})",
			block.ty,
			block.content.len()
		);
	}

	let mut contents = cursor.into_inner();
	contents.splice(metadata_range, encoded_metadata);

	Ok(Some(contents))
}

fn read_vendor(comment_block: &[u8]) -> Option<String> {
	let mut reader = comment_block;
	let vendor_len = reader.read_u32::<LittleEndian>().ok()? as usize;

	match std::str::from_utf8(reader.get(..vendor_len)?) {
		Ok(vendor) => Some(vendor.to_owned()),
		Err(_) => {
			log::warn!("FLAC vendor string is not valid UTF-8, not re-using");
			None
		},
	}
}
