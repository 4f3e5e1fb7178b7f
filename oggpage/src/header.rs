use crate::{PageError, Result};

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

/// The size of a page header, excluding the segment table
pub const PAGE_HEADER_SIZE: usize = 27;

/// An OGG page header
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PageHeader {
	/// The position in the stream the page started at
	pub start: u64,
	pub(crate) header_type_flag: u8,
	/// The page's absolute granule position
	pub abgp: u64,
	/// The page's stream serial number
	pub stream_serial: u32,
	/// The page's sequence number
	pub sequence_number: u32,
	pub(crate) segments: Vec<u8>,
	pub(crate) checksum: u32,
}

impl PageHeader {
	/// Create a new `PageHeader`
	///
	/// The segment table and checksum are left empty, they are filled in once content
	/// is attached to the header.
	pub fn new(header_type_flag: u8, abgp: u64, stream_serial: u32, sequence_number: u32) -> Self {
		Self {
			start: 0,
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			segments: Vec::new(),
			checksum: 0,
		}
	}

	/// Read a page header from a reader
	///
	/// This leaves the reader at the start of the page content.
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * The page is missing the `OggS` capture pattern
	/// * The stream structure version is not 0
	/// * The segment table is empty
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;

		let mut sig = [0; 4];
		data.read_exact(&mut sig)?;

		if &sig != b"OggS" {
			return Err(PageError::MissingMagic);
		}

		// Version, always 0
		let version = data.read_u8()?;

		if version != 0 {
			return Err(PageError::InvalidVersion);
		}

		let header_type_flag = data.read_u8()?;

		let abgp = data.read_u64::<LittleEndian>()?;
		let stream_serial = data.read_u32::<LittleEndian>()?;
		let sequence_number = data.read_u32::<LittleEndian>()?;
		let checksum = data.read_u32::<LittleEndian>()?;

		let segment_count = data.read_u8()?;

		if segment_count < 1 {
			return Err(PageError::BadSegmentCount);
		}

		let mut segments = vec![0; segment_count as usize];
		data.read_exact(&mut segments)?;

		Ok(Self {
			start,
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			segments,
			checksum,
		})
	}

	/// Returns the page's header type flag
	pub fn header_type_flag(&self) -> u8 {
		self.header_type_flag
	}

	/// Returns the page's checksum
	pub fn checksum(&self) -> u32 {
		self.checksum
	}

	/// Returns the page's segment table
	pub fn segments(&self) -> &[u8] {
		&self.segments
	}

	/// The total size of the content described by the segment table
	pub fn content_size(&self) -> usize {
		self.segments.iter().map(|&b| usize::from(b)).sum()
	}

	/// Whether the first packet on this page is continued from the previous page
	pub fn is_continuation(&self) -> bool {
		self.header_type_flag & crate::CONTINUED_PACKET != 0
	}

	pub(crate) fn as_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(PAGE_HEADER_SIZE + self.segments.len());

		bytes.extend(b"OggS");
		bytes.push(0); // Version
		bytes.push(self.header_type_flag);
		bytes.extend(self.abgp.to_le_bytes());
		bytes.extend(self.stream_serial.to_le_bytes());
		bytes.extend(self.sequence_number.to_le_bytes());
		bytes.extend(self.checksum.to_le_bytes());
		bytes.push(self.segments.len() as u8);
		bytes.extend(self.segments.iter());

		bytes
	}
}
