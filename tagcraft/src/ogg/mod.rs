//! Ogg Vorbis and Opus
//!
//! ## File notes
//!
//! The only supported tag format is [`VorbisComments`], stored in the second header packet of
//! the stream. That packet may span any number of pages, so writing a tag repaginates the
//! header packets and renumbers every page that follows.
pub(crate) mod constants;
mod opus;
mod picture_storage;
pub(crate) mod read;
mod tag;
mod vorbis;
pub(crate) mod write;

use crate::error::Result;
use crate::macros::decode_err;

use std::io::{Cursor, Read, Seek, SeekFrom};

use oggpage::{MAX_CONTENT_SIZE, PAGE_HEADER_SIZE, Page, PageError};

// Exports

pub use opus::OpusFile;
pub use opus::properties::OpusProperties;
pub use picture_storage::OggPictureStorage;
pub use tag::VorbisComments;
pub use vorbis::VorbisFile;
pub use vorbis::properties::VorbisProperties;

// Header, a full segment table, and the largest possible content
const MAX_PAGE_SIZE: u64 = (PAGE_HEADER_SIZE + 255 + MAX_CONTENT_SIZE) as u64;

fn verify_signature(content: &[u8], sig: &[u8]) -> Result<()> {
	if !content.starts_with(sig) {
		decode_err!(@BAIL "Ogg: Packet is missing its signature");
	}

	Ok(())
}

/// Find the last page in the stream
///
/// A page can't be larger than [`MAX_PAGE_SIZE`], so only the tail of the stream is searched.
/// Candidates must have a valid checksum, since the capture pattern can show up in page content.
fn find_last_page<R>(data: &mut R) -> Result<Page>
where
	R: Read + Seek,
{
	const CAPTURE_PATTERN: &[u8] = b"OggS";

	let stream_len = data.seek(SeekFrom::End(0))?;
	data.seek(SeekFrom::Start(stream_len.saturating_sub(MAX_PAGE_SIZE)))?;

	let mut tail = Vec::new();
	data.read_to_end(&mut tail)?;

	let mut search_end = tail.len();
	while let Some(pos) = tail[..search_end]
		.windows(CAPTURE_PATTERN.len())
		.rposition(|window| window == CAPTURE_PATTERN)
	{
		match Page::read(&mut Cursor::new(&tail[pos..])) {
			Ok(page) if page.verify_crc().is_ok() => return Ok(page),
			// False positive, keep searching
			_ => search_end = pos + CAPTURE_PATTERN.len() - 1,
		}
	}

	Err(PageError::MissingMagic.into())
}

#[cfg(test)]
mod tests {
	use super::find_last_page;

	use std::io::Cursor;

	use oggpage::{CONTAINS_LAST_PAGE_OF_BITSTREAM, Page, PageHeader};

	fn page(abgp: u64, sequence_number: u32, content: Vec<u8>) -> Vec<u8> {
		let mut page = Page::new(PageHeader::new(0, abgp, 1, sequence_number), content).unwrap();
		page.gen_crc();
		page.as_bytes()
	}

	#[test_log::test]
	fn last_page() {
		let mut stream = page(0, 0, vec![1; 100]);
		stream.extend(page(4800, 1, vec![2; 100]));

		let mut last = Page::new(
			PageHeader::new(CONTAINS_LAST_PAGE_OF_BITSTREAM, 9600, 1, 2),
			// The capture pattern inside the content must not be mistaken for a page
			b"garbage OggS garbage".to_vec(),
		)
		.unwrap();
		last.gen_crc();
		stream.extend(last.as_bytes());

		let found = find_last_page(&mut Cursor::new(stream)).unwrap();
		assert_eq!(found.header().abgp, 9600);
	}

	#[test_log::test]
	fn no_pages() {
		assert!(find_last_page(&mut Cursor::new(b"not an ogg stream".to_vec())).is_err());
	}
}
