//! OGG page framing
//!
//! This crate handles the page layer of an OGG bitstream: reading and writing
//! page headers, calculating page checksums, reassembling packets that span
//! multiple pages, and splitting packets back into pages.

mod crc;
mod error;
mod header;
mod packets;
mod paginate;

use std::io::{Read, Seek};

pub use crc::crc32;
pub use error::{PageError, Result};
pub use header::{PAGE_HEADER_SIZE, PageHeader};
pub use packets::{Packets, PacketsIter};
pub use paginate::paginate;

const CONTINUED_PACKET: u8 = 0x01;

/// The maximum number of segments a page written by this crate will contain
///
/// This matches the behavior of libogg, which will produce pages of roughly 4-8KB.
pub(crate) const MAX_WRITTEN_SEGMENT_COUNT: usize = 32;
/// The maximum page content size written by this crate
pub(crate) const MAX_WRITTEN_CONTENT_SIZE: usize = MAX_WRITTEN_SEGMENT_COUNT * 255;

/// The maximum page content size
pub const MAX_CONTENT_SIZE: usize = 65025;
/// The page contains the first page of the logical bitstream
pub const CONTAINS_FIRST_PAGE_OF_BITSTREAM: u8 = 0x02;
/// The page contains the last page of the logical bitstream
pub const CONTAINS_LAST_PAGE_OF_BITSTREAM: u8 = 0x04;

/// An OGG page
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
	content: Vec<u8>,
	header: PageHeader,
	/// The position in the stream the page ended
	pub end: u64,
}

impl Page {
	/// Create a new `Page`
	///
	/// The checksum will be 0, see [`Page::gen_crc`].
	///
	/// # Errors
	///
	/// `content` does not fit in a single page
	pub fn new(header: PageHeader, content: Vec<u8>) -> Result<Self> {
		let segments = segment_table(content.len())?;

		let mut header = header;
		header.segments = segments;

		let end = header.start + (PAGE_HEADER_SIZE + header.segments.len() + content.len()) as u64;

		Ok(Self {
			content,
			header,
			end,
		})
	}

	/// Convert the Page to `Vec<u8>` for writing
	///
	/// NOTE: This will write the checksum as is. It is likely [`Page::gen_crc`] will have
	/// to be used prior.
	pub fn as_bytes(&self) -> Vec<u8> {
		let mut bytes = self.header.as_bytes();
		bytes.extend(self.content.iter());

		bytes
	}

	/// Attempts to get a Page from a reader
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * [`PageError`]
	pub fn read<V>(data: &mut V) -> Result<Self>
	where
		V: Read + Seek,
	{
		let header = PageHeader::read(data)?;

		let mut content = vec![0; header.content_size()];
		data.read_exact(&mut content)?;

		let end = data.stream_position()?;

		Ok(Page {
			content,
			header,
			end,
		})
	}

	/// Generates the CRC checksum of the page
	pub fn gen_crc(&mut self) {
		self.header.checksum = 0;
		self.header.checksum = crc::crc32(&self.as_bytes());
	}

	/// Verifies the page's stored checksum
	///
	/// # Errors
	///
	/// The stored checksum doesn't match the calculated checksum
	pub fn verify_crc(&self) -> Result<()> {
		let stored = self.header.checksum;

		let mut copy = self.clone();
		copy.gen_crc();

		let calculated = copy.header.checksum;
		if stored != calculated {
			return Err(PageError::BadChecksum { stored, calculated });
		}

		Ok(())
	}

	/// Returns a reference to the page's header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// Returns a mutable reference to the page's header
	///
	/// NOTE: Any changes require the checksum to be regenerated with [`Page::gen_crc`]
	pub fn header_mut(&mut self) -> &mut PageHeader {
		&mut self.header
	}

	/// Returns the page's content
	pub fn content(&self) -> &[u8] {
		self.content.as_slice()
	}

	/// Consumes the page and returns its content
	pub fn take_content(self) -> Vec<u8> {
		self.content
	}
}

/// Creates a segment table based on the length
///
/// A length that is a multiple of 255 requires a trailing zero-length segment
/// to terminate the packet.
///
/// # Errors
///
/// `length` > [`MAX_CONTENT_SIZE`]
pub fn segment_table(length: usize) -> Result<Vec<u8>> {
	if length == 0 {
		return Ok(vec![0]);
	}

	let needed = (length / 255) + 1;
	if needed > 255 {
		return Err(PageError::TooMuchData);
	}

	let mut segments = vec![255; needed - 1];
	segments.push((length % 255) as u8);

	Ok(segments)
}
