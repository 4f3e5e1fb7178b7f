use super::constants::{METADATA_BLOCK_PICTURE, OPUSTAGS, VORBIS_COMMENT_HEAD};
use super::tag::VorbisComments;
use super::verify_signature;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::macros::{decode_err, err};
use crate::probe::Probe;
use crate::util::io::{FileLike, overwrite};

use std::borrow::Cow;
use std::io::{Cursor, Seek};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use oggpage::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, Packets, Page, PageHeader};

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(crate) enum OggFormat {
	Opus,
	Vorbis,
}

impl OggFormat {
	pub(crate) fn from_file_type(file_type: FileType) -> Option<Self> {
		match file_type {
			FileType::Opus => Some(OggFormat::Opus),
			FileType::Vorbis => Some(OggFormat::Vorbis),
			_ => None,
		}
	}

	fn comment_signature(self) -> &'static [u8] {
		match self {
			OggFormat::Opus => OPUSTAGS,
			OggFormat::Vorbis => VORBIS_COMMENT_HEAD,
		}
	}

	// Identification, comment, and (Vorbis only) setup
	fn header_packet_count(self) -> isize {
		match self {
			OggFormat::Opus => 2,
			OggFormat::Vorbis => 3,
		}
	}
}

/// Write Vorbis comments to a FLAC, Ogg Vorbis, or Opus file
///
/// The format is determined from the file's content.
pub(crate) fn write_to<F>(file: &mut F, tag: &VorbisComments, write_options: WriteOptions) -> Result<()>
where
	F: FileLike + ?Sized,
{
	file.rewind()?;
	let file_type = Probe::new(&mut *file).guess_file_type()?.file_type();
	file.rewind()?;

	match file_type {
		Some(FileType::Flac) => crate::flac::write::write_to(file, tag, write_options),
		Some(file_type) => match OggFormat::from_file_type(file_type) {
			Some(format) => write(file, tag, format),
			None => err!(UnsupportedTag),
		},
		None => err!(UnknownFormat),
	}
}

pub(crate) fn write<F>(file: &mut F, tag: &VorbisComments, format: OggFormat) -> Result<()>
where
	F: FileLike + ?Sized,
{
	file.rewind()?;
	let mut contents = Vec::new();
	file.read_to_end(&mut contents)?;

	let rebuilt = rebuild(&contents, tag, format)?;
	overwrite(file, &rebuilt)
}

fn rebuild(contents: &[u8], tag: &VorbisComments, format: OggFormat) -> Result<Vec<u8>> {
	let mut reader = Cursor::new(contents);

	// The stream serial is needed for the new pages
	let first_page_header = PageHeader::read(&mut reader)?;
	reader.rewind()?;

	let mut packets = Packets::read_count(&mut reader, format.header_packet_count())?;
	let headers_end = reader.position() as usize;

	let Some(comment_packet) = packets.get(1) else {
		decode_err!(@BAIL "Ogg: Expected comment packet");
	};

	let signature = format.comment_signature();
	verify_signature(comment_packet, signature)?;

	// An empty vendor keeps the file's
	let vendor = if tag.vendor.is_empty() {
		Cow::Owned(file_vendor(&comment_packet[signature.len()..]))
	} else {
		Cow::Borrowed(tag.vendor.as_str())
	};

	let mut new_comment_packet = signature.to_vec();
	new_comment_packet.extend(create_comment_block(tag, &vendor, true)?);
	if format == OggFormat::Vorbis {
		// Framing bit
		new_comment_packet.push(1);
	}

	if !packets.set(1, &new_comment_packet) {
		decode_err!(@BAIL "Ogg: Expected comment packet");
	}

	let mut rebuilt = Vec::with_capacity(contents.len());
	let pages_written = packets.write_to(
		&mut rebuilt,
		first_page_header.stream_serial,
		0,
		CONTAINS_FIRST_PAGE_OF_BITSTREAM,
	)? as u32;

	log::debug!(
		"Ogg: Header packets span {pages_written} pages, renumbering the rest of the stream"
	);

	// Every following page needs a new sequence number, and therefore a new checksum
	let remaining = &contents[headers_end..];
	let mut pages = Cursor::new(remaining);
	let mut sequence_number = pages_written;
	loop {
		let page_start = pages.position() as usize;
		if page_start == remaining.len() {
			break;
		}

		match Page::read(&mut pages) {
			Ok(mut page) => {
				page.header_mut().sequence_number = sequence_number;
				page.gen_crc();
				rebuilt.extend(page.as_bytes());
				sequence_number += 1;
			},
			Err(e) => {
				log::warn!("Ogg: Keeping {} trailing bytes as-is ({e})", remaining.len() - page_start);
				rebuilt.extend(&remaining[page_start..]);
				break;
			},
		}
	}

	Ok(rebuilt)
}

fn file_vendor(mut comment_block: &[u8]) -> String {
	let Ok(vendor_len) = comment_block.read_u32::<LittleEndian>() else {
		return String::new();
	};

	match comment_block
		.get(..vendor_len as usize)
		.map(std::str::from_utf8)
	{
		Some(Ok(vendor)) => vendor.to_owned(),
		_ => {
			log::warn!("Ogg: File's vendor string is unreadable, not re-using it");
			String::new()
		},
	}
}

/// Create a comment block, without a signature or framing bit
///
/// Items with empty values are skipped. FLAC stores its pictures in their own blocks, so
/// `with_pictures` is only set for Ogg streams.
pub(crate) fn create_comment_block(
	tag: &VorbisComments,
	vendor: &str,
	with_pictures: bool,
) -> Result<Vec<u8>> {
	let mut block = Vec::new();

	block.write_u32::<LittleEndian>(vendor.len() as u32)?;
	block.extend(vendor.as_bytes());

	let mut fields = Vec::new();
	let mut count = 0_u32;

	for (key, value) in &tag.items {
		if value.is_empty() {
			continue;
		}

		let Ok(len) = u32::try_from(key.len() + 1 + value.len()) else {
			err!(TooMuchData);
		};

		fields.write_u32::<LittleEndian>(len)?;
		fields.extend(key.as_bytes());
		fields.push(b'=');
		fields.extend(value.as_bytes());
		count += 1;
	}

	if with_pictures {
		for (picture, information) in &tag.pictures {
			let encoded = picture.as_flac_bytes(*information, true);

			let Ok(len) = u32::try_from(METADATA_BLOCK_PICTURE.len() + 1 + encoded.len()) else {
				err!(TooMuchData);
			};

			fields.write_u32::<LittleEndian>(len)?;
			fields.extend(METADATA_BLOCK_PICTURE.as_bytes());
			fields.push(b'=');
			fields.extend(encoded);
			count += 1;
		}
	}

	block.write_u32::<LittleEndian>(count)?;
	block.extend(fields);

	Ok(block)
}

#[cfg(test)]
mod tests {
	use super::create_comment_block;
	use crate::config::ParseOptions;
	use crate::ogg::VorbisComments;
	use crate::ogg::read::read_comments;
	use crate::picture::{MimeType, Picture, PictureType};

	#[test_log::test]
	fn comment_block() {
		let mut tag = VorbisComments::new();
		tag.push(String::from("TITLE"), String::from("Foo title"));
		tag.push(String::from("ARTIST"), String::new());
		tag.pictures.push((
			Picture::unchecked(vec![1, 2, 3])
				.pic_type(PictureType::CoverBack)
				.mime_type(MimeType::Jpeg)
				.build(),
			Default::default(),
		));

		let block = create_comment_block(&tag, "vendor", true).unwrap();
		let read = read_comments(&mut &block[..], ParseOptions::new()).unwrap();

		assert_eq!(read.vendor(), "vendor");
		// The empty ARTIST is skipped
		assert_eq!(read.items().len(), 1);
		assert_eq!(read.pictures, tag.pictures);

		let block = create_comment_block(&tag, "vendor", false).unwrap();
		let read = read_comments(&mut &block[..], ParseOptions::new()).unwrap();
		assert!(read.pictures.is_empty());
	}
}
